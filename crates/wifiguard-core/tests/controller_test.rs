#![allow(clippy::unwrap_used)]
// Integration tests for `WifiController` against a simulated router.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use wifiguard_api::{AppCredentials, RouterClient, SessionClient, SessionPhase, SessionPolicy};
use wifiguard_core::{WifiController, WifiPlanningState, WifiState};

// ── Simulated router ────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct RouterState {
    wifi_enabled: bool,
    use_planning: bool,
    /// Overrides the access point state derived from `wifi_enabled`.
    ap_state: Option<&'static str>,
    /// Answer PUTs with this `use_planning` regardless of the request.
    stuck_planning: Option<bool>,
    /// Fail every `wifi/config/` PUT.
    radio_broken: bool,
}

impl Default for RouterState {
    fn default() -> Self {
        Self {
            wifi_enabled: true,
            use_planning: false,
            ap_state: None,
            stuck_planning: None,
            radio_broken: false,
        }
    }
}

#[derive(Clone, Copy)]
enum Route {
    Config,
    AccessPoints,
    Planning,
}

struct Sim {
    state: Arc<Mutex<RouterState>>,
    route: Route,
}

fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "result": result }))
}

impl Respond for Sim {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let body: Option<Value> = serde_json::from_slice(&request.body).ok();
        let is_put = request.method.as_str() == "PUT";

        match self.route {
            Route::Config => {
                if is_put {
                    if state.radio_broken {
                        return ResponseTemplate::new(500).set_body_json(json!({
                            "success": false,
                            "error_code": "internal_error",
                            "msg": "Erreur interne"
                        }));
                    }
                    if let Some(enabled) = body.as_ref().and_then(|b| b["enabled"].as_bool()) {
                        state.wifi_enabled = enabled;
                    }
                }
                ok(json!({ "enabled": state.wifi_enabled, "mac_filter_state": "disabled" }))
            }
            Route::AccessPoints => {
                let ap_state = state
                    .ap_state
                    .unwrap_or(if state.wifi_enabled { "active" } else { "disabled" });
                ok(json!([
                    { "id": 0, "name": "5G", "status": { "state": ap_state, "channel_width": "80" } }
                ]))
            }
            Route::Planning => {
                if is_put {
                    if let Some(wanted) = body.as_ref().and_then(|b| b["use_planning"].as_bool()) {
                        state.use_planning = state.stuck_planning.unwrap_or(wanted);
                    }
                }
                ok(json!({ "use_planning": state.use_planning, "resolution": 30, "mapping": [] }))
            }
        }
    }
}

async fn setup(initial: RouterState) -> (MockServer, WifiController, Arc<Mutex<RouterState>>) {
    let server = MockServer::start().await;
    let state = Arc::new(Mutex::new(initial));

    Mock::given(method("GET"))
        .and(path("/api/v8/login/"))
        .respond_with(ok(json!({ "logged_in": false, "challenge": "c1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v8/login/session/"))
        .respond_with(ok(json!({ "session_token": "tok" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v8/login/logout/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    for (suffix, route) in [
        ("wifi/config/", Route::Config),
        ("wifi/ap/", Route::AccessPoints),
        ("wifi/planning/", Route::Planning),
    ] {
        Mock::given(path(format!("/api/v8/{suffix}")))
            .respond_with(Sim {
                state: Arc::clone(&state),
                route,
            })
            .mount(&server)
            .await;
    }

    let base = Url::parse(&format!("{}/api/v8/", server.uri())).unwrap();
    let session = SessionClient::new(
        RouterClient::with_client(reqwest::Client::new(), &base),
        AppCredentials {
            app_id: "fr.wifiguard.test".into(),
            app_version: "0.1.0".into(),
            app_token: SecretString::from("app-token".to_owned()),
        },
        SessionPolicy::default(),
    );
    (server, WifiController::from_session(session), state)
}

// ── State queries ───────────────────────────────────────────────────

#[tokio::test]
async fn test_active_with_planning_is_active_planned() {
    let (_server, controller, _) = setup(RouterState {
        use_planning: true,
        ..RouterState::default()
    })
    .await;

    assert_eq!(controller.get_wifi_state().await, WifiState::ActivePlanned);
    assert_eq!(controller.get_wifi_planning_state().await, WifiPlanningState::Enabled);
}

#[tokio::test]
async fn test_active_without_planning() {
    let (_server, controller, _) = setup(RouterState::default()).await;
    assert_eq!(controller.get_wifi_state().await, WifiState::Active);
}

#[tokio::test]
async fn test_down_states_read_as_inactive() {
    for ap_state in ["inactive", "disabled", "disabled_planning"] {
        let (_server, controller, _) = setup(RouterState {
            ap_state: Some(ap_state),
            ..RouterState::default()
        })
        .await;
        assert_eq!(controller.get_wifi_state().await, WifiState::Inactive, "{ap_state}");
    }
}

#[tokio::test]
async fn test_failed_access_point() {
    let (_server, controller, _) = setup(RouterState {
        ap_state: Some("failed"),
        ..RouterState::default()
    })
    .await;
    assert_eq!(controller.get_wifi_state().await, WifiState::Failed);
}

#[tokio::test]
async fn test_unreachable_router_reads_unknown() {
    // Nothing listens on port 9 locally.
    let base = Url::parse("http://127.0.0.1:9/api/v8/").unwrap();
    let session = SessionClient::new(
        RouterClient::with_client(reqwest::Client::new(), &base),
        AppCredentials {
            app_id: "fr.wifiguard.test".into(),
            app_version: "0.1.0".into(),
            app_token: SecretString::from("app-token".to_owned()),
        },
        SessionPolicy::default(),
    );
    let controller = WifiController::from_session(session);

    assert_eq!(controller.get_wifi_state().await, WifiState::Unknown);
    assert_eq!(controller.get_wifi_planning_state().await, WifiPlanningState::Unknown);
    assert!(!controller.activate_wifi().await);
    assert!(!controller.set_wifi_planning_state(false).await);
}

#[tokio::test]
async fn test_access_points_are_typed() {
    let (_server, controller, _) = setup(RouterState::default()).await;
    let aps = controller.access_points().await.unwrap();
    assert_eq!(aps.len(), 1);
    assert_eq!(aps[0].name.as_deref(), Some("5G"));
    assert_eq!(aps[0].status, "active");
    assert_eq!(aps[0].state, WifiState::Active);
}

// ── Toggles ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_disable_planning_confirmed_by_echo() {
    let (_server, controller, state) = setup(RouterState {
        use_planning: true,
        ..RouterState::default()
    })
    .await;

    assert!(controller.set_wifi_planning_state(false).await);
    assert!(!state.lock().unwrap().use_planning);
}

#[tokio::test]
async fn test_inconsistent_planning_echo_is_failure() {
    let (_server, controller, _) = setup(RouterState {
        use_planning: true,
        stuck_planning: Some(true),
        ..RouterState::default()
    })
    .await;

    assert!(!controller.set_wifi_planning_state(false).await);
}

#[tokio::test]
async fn test_activate_then_observe_active() {
    let (_server, controller, _) = setup(RouterState {
        wifi_enabled: false,
        ..RouterState::default()
    })
    .await;

    assert_eq!(controller.get_wifi_state().await, WifiState::Inactive);
    assert!(controller.activate_wifi().await);
    assert!(controller.get_wifi_state().await.is_up());

    assert!(controller.deactivate_wifi().await);
    assert_eq!(controller.get_wifi_state().await, WifiState::Inactive);
}

// ── Corrective poll ─────────────────────────────────────────────────

#[tokio::test]
async fn test_enforce_fixes_both() {
    let (_server, controller, state) = setup(RouterState {
        wifi_enabled: false,
        use_planning: true,
        ..RouterState::default()
    })
    .await;

    let report = controller.enforce().await;

    insta::assert_json_snapshot!(report, { ".checked_at" => "[timestamp]" }, @r#"
    {
      "wifi_state": "inactive",
      "wifi_planning_state": "disabled",
      "wifi_activated": true,
      "planning_disabled": true,
      "checked_at": "[timestamp]"
    }
    "#);

    let state = state.lock().unwrap();
    assert!(state.wifi_enabled);
    assert!(!state.use_planning);
}

#[tokio::test]
async fn test_enforce_leaves_healthy_router_alone() {
    let (server, controller, _) = setup(RouterState::default()).await;

    let report = controller.enforce().await;

    assert_eq!(report.wifi_state, WifiState::Active);
    assert_eq!(report.wifi_planning_state, WifiPlanningState::Disabled);
    assert_eq!(report.wifi_activated, None);
    assert_eq!(report.planning_disabled, None);

    let puts = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PUT")
        .count();
    assert_eq!(puts, 0);
}

#[tokio::test]
async fn test_enforce_attempts_corrections_independently() {
    let (_server, controller, state) = setup(RouterState {
        wifi_enabled: false,
        use_planning: true,
        radio_broken: true,
        ..RouterState::default()
    })
    .await;

    let report = controller.enforce().await;

    assert_eq!(report.wifi_activated, Some(false));
    assert_eq!(report.planning_disabled, Some(true));
    assert!(!report.corrections_succeeded());
    assert!(!state.lock().unwrap().use_planning);
}

#[tokio::test]
async fn test_close_logs_out_once() {
    let (server, controller, _) = setup(RouterState::default()).await;

    controller.get_wifi_planning_state().await;
    controller.close().await;
    controller.close().await;

    let logouts = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/api/v8/login/logout/")
        .count();
    assert_eq!(logouts, 1);
}

#[tokio::test]
async fn test_phase_observers_follow_the_session() {
    let (_server, controller, _) = setup(RouterState::default()).await;
    let mut phases = controller.subscribe_phase();
    assert_eq!(controller.session_phase(), SessionPhase::NoSession);

    controller.get_wifi_planning_state().await;
    assert!(phases.has_changed().unwrap());
    assert_eq!(*phases.borrow_and_update(), SessionPhase::Ready);

    controller.close().await;
    assert_eq!(*phases.borrow_and_update(), SessionPhase::NoSession);
    assert_eq!(controller.session_phase(), SessionPhase::NoSession);
}
