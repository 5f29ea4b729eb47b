//! One-time app registration.
//!
//! Asks the router for an app token, waits while the operator confirms on
//! the router's front panel, then stores the token where the user chose.

use std::io::IsTerminal;
use std::time::Duration;

use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;

use wifiguard_api::{AuthorizationStatus, RouterClient, TlsMode, TransportConfig};

use crate::cli::{GlobalOpts, RegisterArgs, TokenStore};
use crate::config;
use crate::error::CliError;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Poll the registration until the router decides or `wait` runs out.
async fn await_decision(
    client: &RouterClient,
    track_id: u64,
    wait: Duration,
    interval: Duration,
    progress: &ProgressBar,
) -> Result<(), CliError> {
    let deadline = Instant::now() + wait;
    loop {
        match client.authorization_status(track_id).await? {
            AuthorizationStatus::Granted => return Ok(()),
            AuthorizationStatus::Denied => return Err(CliError::RegistrationDenied),
            AuthorizationStatus::Timeout => {
                return Err(CliError::RegistrationTimeout {
                    seconds: wait.as_secs(),
                });
            }
            AuthorizationStatus::Unknown => {
                return Err(CliError::RegistrationUnknown { track_id });
            }
            AuthorizationStatus::Pending => {}
        }

        if Instant::now() + interval > deadline {
            return Err(CliError::RegistrationTimeout {
                seconds: wait.as_secs(),
            });
        }
        progress.tick();
        tokio::time::sleep(interval).await;
    }
}

fn choose_store(requested: TokenStore) -> Result<TokenStore, CliError> {
    if requested != TokenStore::Ask {
        return Ok(requested);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(TokenStore::Print);
    }
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
        "Only print it",
    ];
    let selection = Select::new()
        .with_prompt("Where should the app token be kept?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(match selection {
        0 => TokenStore::Keyring,
        1 => TokenStore::Config,
        _ => TokenStore::Print,
    })
}

pub async fn handle(args: RegisterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let base_url = wifiguard_config::router_url(&cfg.router)?;
    let identity = wifiguard_config::identity(&cfg.router);
    let transport = TransportConfig {
        tls: TlsMode::from(&wifiguard_config::tls_verification(&cfg.router)),
        timeout: Duration::from_secs(cfg.router.timeout_secs),
    };
    let client = RouterClient::new(&base_url, &transport)?;

    let pending = client.request_authorization(&identity).await?;
    eprintln!(
        "Registration requested for \"{}\" (track id {}).\n\
         Confirm it on the router's front panel.",
        identity.app_name, pending.track_id
    );

    let progress = spinner(global.quiet);
    progress.set_message("waiting for confirmation on the router");
    let decision = await_decision(
        &client,
        pending.track_id,
        Duration::from_secs(args.wait),
        POLL_INTERVAL,
        &progress,
    )
    .await;
    progress.finish_and_clear();
    decision?;

    eprintln!("   ✓ app registered");
    persist(&pending.app_token, pending.track_id, choose_store(args.store)?, global)
}

/// Show the granted token, keep it where asked, and record the track id
/// in the config file.
fn persist(
    token: &SecretString,
    track_id: u64,
    store: TokenStore,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = config::config_path(global);
    let mut file_cfg = wifiguard_config::load_file_config(Some(path.as_path()))?;
    file_cfg.router.track_id = Some(track_id);
    if file_cfg.router.url.is_none() {
        file_cfg.router.url.clone_from(&global.url);
    }

    println!("app_token = {}", token.expose_secret());
    println!("track_id = {track_id}");

    match store {
        TokenStore::Keyring => {
            wifiguard_config::store_app_token(token)?;
            eprintln!("   ✓ app token stored in system keyring");
        }
        TokenStore::Config => {
            file_cfg.router.app_token = Some(token.expose_secret().to_owned());
        }
        TokenStore::Print | TokenStore::Ask => {}
    }

    let written = wifiguard_config::save_config(&file_cfg, Some(path.as_path()))?;
    eprintln!("   ✓ config written to {}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn status(value: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": { "status": value, "challenge": "c" }
        }))
    }

    fn client_for(server: &MockServer) -> RouterClient {
        let base: url::Url = format!("{}/api/v8/", server.uri()).parse().expect("base url");
        RouterClient::new(&base, &TransportConfig::default()).expect("client")
    }

    #[tokio::test]
    async fn pending_then_granted_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/authorize/7"))
            .respond_with(status("pending"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/authorize/7"))
            .respond_with(status("granted"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = await_decision(
            &client,
            7,
            Duration::from_secs(5),
            Duration::from_millis(10),
            &ProgressBar::hidden(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn denial_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/authorize/7"))
            .respond_with(status("denied"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = await_decision(
            &client,
            7,
            Duration::from_secs(5),
            Duration::from_millis(10),
            &ProgressBar::hidden(),
        )
        .await
        .expect_err("denied");
        assert!(matches!(err, CliError::RegistrationDenied));
    }

    #[tokio::test]
    async fn gives_up_when_wait_runs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/authorize/7"))
            .respond_with(status("pending"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = await_decision(
            &client,
            7,
            Duration::from_millis(50),
            Duration::from_millis(20),
            &ProgressBar::hidden(),
        )
        .await
        .expect_err("timed out");
        assert!(matches!(err, CliError::RegistrationTimeout { .. }));
    }

    #[tokio::test]
    async fn forgotten_track_id_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/authorize/7"))
            .respond_with(status("unknown"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = await_decision(
            &client,
            7,
            Duration::from_secs(5),
            Duration::from_millis(10),
            &ProgressBar::hidden(),
        )
        .await
        .expect_err("unknown");
        assert!(matches!(err, CliError::RegistrationUnknown { track_id: 7 }));
    }
}
