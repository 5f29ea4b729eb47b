//! HTTP trigger: liveness on `/`, an on-demand corrective poll on `/wifi`.

use std::net::SocketAddr;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wifiguard_core::{PollReport, WifiController};

use crate::error::CliError;

#[derive(Clone)]
struct TriggerState {
    controller: WifiController,
}

pub fn build_router(controller: WifiController) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/wifi", get(wifi_handler))
        .with_state(TriggerState { controller })
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs the same corrective poll as the scheduler.
async fn wifi_handler(State(state): State<TriggerState>) -> Json<PollReport> {
    info!("corrective poll requested over http");
    Json(state.controller.enforce().await)
}

/// Serve the trigger on `listener` until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    controller: WifiController,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let bind = listener
        .local_addr()
        .map_or_else(|_| "<unknown>".into(), |a| a.to_string());
    info!(%bind, "http trigger listening");

    axum::serve(listener, build_router(controller))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|source| CliError::Server { bind, source })
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, CliError> {
    TcpListener::bind(addr).await.map_err(|source| CliError::Server {
        bind: addr.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use url::Url;
    use wifiguard_api::{AppCredentials, RouterClient, SessionClient, SessionPolicy};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn ok(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "result": result }))
    }

    async fn fake_router() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/"))
            .respond_with(ok(json!({ "challenge": "abc" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v8/login/session/"))
            .respond_with(ok(json!({ "session_token": "tok" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v8/wifi/ap/"))
            .respond_with(ok(json!([{ "id": 0, "status": { "state": "active" } }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v8/wifi/planning/"))
            .respond_with(ok(json!({ "use_planning": false })))
            .mount(&server)
            .await;
        server
    }

    async fn start_trigger(router: &MockServer) -> (SocketAddr, CancellationToken) {
        let base = Url::parse(&format!("{}/api/v8/", router.uri())).expect("valid url");
        let session = SessionClient::new(
            RouterClient::with_client(reqwest::Client::new(), &base),
            AppCredentials {
                app_id: "fr.wifiguard.test".into(),
                app_version: "0.1.0".into(),
                app_token: SecretString::from("t".to_owned()),
            },
            SessionPolicy::default(),
        );
        let controller = WifiController::from_session(session);

        let listener = bind("127.0.0.1:0".parse().expect("valid addr"))
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let cancel = CancellationToken::new();
        tokio::spawn(serve(listener, controller, cancel.clone()));
        (addr, cancel)
    }

    #[tokio::test]
    async fn liveness_endpoint() {
        let router = fake_router().await;
        let (addr, cancel) = start_trigger(&router).await;

        let body: Value = reqwest::get(format!("http://{addr}/"))
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(body, json!({ "status": "ok" }));
        cancel.cancel();
    }

    #[tokio::test]
    async fn wifi_endpoint_returns_report() {
        let router = fake_router().await;
        let (addr, cancel) = start_trigger(&router).await;

        let body: Value = reqwest::get(format!("http://{addr}/wifi"))
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(body["wifi_state"], "active");
        assert_eq!(body["wifi_planning_state"], "disabled");
        assert!(body.get("wifi_activated").is_none());
        assert!(body["checked_at"].is_string());
        cancel.cancel();
    }
}
