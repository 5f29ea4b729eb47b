// ── WiFi controller ──
//
// Domain operations on top of the shared router session. Queries and
// toggles never fail outward: this runs unattended, so any error is
// logged and folded into `Unknown` or `false`, and the next poll is the
// retry.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use wifiguard_api::{Endpoint, RouterClient, SessionClient, SessionPhase};

use crate::config::RouterConfig;
use crate::error::CoreError;
use crate::model::{AccessPoint, PollReport, WifiPlanningState, WifiState};

/// The single entry point to the router for every consumer.
///
/// Cheaply cloneable; clones share one session. Built once at startup and
/// handed to the scheduler and the HTTP trigger.
#[derive(Clone)]
pub struct WifiController {
    session: SessionClient,
}

impl WifiController {
    /// Build a controller from configuration. Does NOT authenticate; the
    /// first operation does.
    pub fn new(config: &RouterConfig) -> Result<Self, CoreError> {
        let router = RouterClient::new(&config.url, &config.transport())?;
        debug!(url = %config.url, app_id = %config.identity.app_id, "router client ready");
        Ok(Self::from_session(SessionClient::new(
            router,
            config.credentials(),
            config.session,
        )))
    }

    pub fn from_session(session: SessionClient) -> Self {
        Self { session }
    }

    /// Lifecycle phase of the shared session.
    pub fn session_phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Follow session phase changes (logins, idle closes, logouts).
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.session.subscribe_phase()
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Current radio state, upgraded to `ActivePlanned` when a planning
    /// schedule is in force.
    pub async fn get_wifi_state(&self) -> WifiState {
        let access_points = match self.session.access_points().await {
            Ok(raw) => raw.into_iter().map(AccessPoint::from).collect::<Vec<_>>(),
            Err(e) => {
                warn!(error = %e, endpoint = %Endpoint::WifiAp, "could not read access points");
                return WifiState::Unknown;
            }
        };

        let state = WifiState::from_access_points(&access_points);
        debug!(%state, access_points = access_points.len(), "wifi state");
        if state != WifiState::Active {
            return state;
        }

        match self.get_wifi_planning_state().await {
            WifiPlanningState::Enabled => WifiState::ActivePlanned,
            _ => WifiState::Active,
        }
    }

    pub async fn get_wifi_planning_state(&self) -> WifiPlanningState {
        match self.session.wifi_planning().await {
            Ok(planning) => WifiPlanningState::from(planning.use_planning),
            Err(e) => {
                warn!(error = %e, endpoint = %Endpoint::WifiPlanning, "could not read wifi planning");
                WifiPlanningState::Unknown
            }
        }
    }

    /// Typed access point list, for display. Errors propagate.
    pub async fn access_points(&self) -> Result<Vec<AccessPoint>, CoreError> {
        let raw = self.session.access_points().await?;
        Ok(raw.into_iter().map(AccessPoint::from).collect())
    }

    // ── Toggles ──────────────────────────────────────────────────

    /// Switch the planning schedule. `true` only if the router accepted
    /// the change and echoes the requested value.
    pub async fn set_wifi_planning_state(&self, enabled: bool) -> bool {
        match self.session.set_wifi_planning(enabled).await {
            Ok(echo) if echo.use_planning == enabled => true,
            Ok(echo) => {
                warn!(
                    endpoint = %Endpoint::WifiPlanning,
                    requested = enabled,
                    echoed = echo.use_planning,
                    "router echoed a different planning state"
                );
                false
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.api_error_code(),
                    endpoint = %Endpoint::WifiPlanning,
                    payload = %serde_json::json!({ "use_planning": enabled }),
                    "could not update wifi planning"
                );
                false
            }
        }
    }

    pub async fn activate_wifi(&self) -> bool {
        self.set_radio(true).await
    }

    pub async fn deactivate_wifi(&self) -> bool {
        self.set_radio(false).await
    }

    async fn set_radio(&self, enabled: bool) -> bool {
        match self.session.set_wifi_enabled(enabled).await {
            Ok(echo) if echo.enabled == enabled => true,
            Ok(echo) => {
                warn!(
                    endpoint = %Endpoint::WifiConfig,
                    requested = enabled,
                    echoed = echo.enabled,
                    "router echoed a different radio state"
                );
                false
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.api_error_code(),
                    endpoint = %Endpoint::WifiConfig,
                    payload = %serde_json::json!({ "enabled": enabled }),
                    "could not update wifi config"
                );
                false
            }
        }
    }

    // ── Corrective poll ──────────────────────────────────────────

    /// Bring the router back to "WiFi on, no planning".
    ///
    /// Both corrections are attempted independently of each other.
    pub async fn enforce(&self) -> PollReport {
        info!("checking wifi state");
        let wifi_state = self.get_wifi_state().await;

        let wifi_activated = if wifi_state == WifiState::Inactive {
            info!("wifi is inactive, activating");
            let activated = self.activate_wifi().await;
            if activated {
                info!("wifi activated");
            } else {
                error!("failed to activate wifi");
            }
            Some(activated)
        } else {
            None
        };

        let planning_disabled = if self.get_wifi_planning_state().await == WifiPlanningState::Enabled
        {
            info!("wifi planning is enabled, disabling");
            let disabled = self.set_wifi_planning_state(false).await;
            if disabled {
                info!("wifi planning disabled");
            } else {
                error!("failed to disable wifi planning");
            }
            Some(disabled)
        } else {
            None
        };

        let wifi_planning_state = self.get_wifi_planning_state().await;

        PollReport {
            wifi_state,
            wifi_planning_state,
            wifi_activated,
            planning_disabled,
            checked_at: Utc::now(),
        }
    }

    /// Log out and drop the session. Used at shutdown.
    pub async fn close(&self) {
        self.session.close_session().await;
    }
}
