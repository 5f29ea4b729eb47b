// WiFi endpoints
//
// Radio on/off, access point status, and the planning (time-based
// schedule) switch. All calls go through the shared session.

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::{RawAccessPoint, WifiConfig, WifiPlanning};
use crate::session::SessionClient;

impl SessionClient {
    /// Global WiFi configuration.
    ///
    /// `GET wifi/config/`
    pub async fn wifi_config(&self) -> Result<WifiConfig, Error> {
        self.authenticated_get(Endpoint::WifiConfig).await
    }

    /// Switch the WiFi radio on or off. Returns the configuration the
    /// router echoes back.
    ///
    /// `PUT wifi/config/` with `{"enabled": ...}`
    pub async fn set_wifi_enabled(&self, enabled: bool) -> Result<WifiConfig, Error> {
        debug!(enabled, "updating wifi config");
        self.authenticated_put(Endpoint::WifiConfig, &WifiConfig { enabled })
            .await
    }

    /// List access points with their status.
    ///
    /// `GET wifi/ap/`
    pub async fn access_points(&self) -> Result<Vec<RawAccessPoint>, Error> {
        self.authenticated_get(Endpoint::WifiAp).await
    }

    /// WiFi planning configuration.
    ///
    /// `GET wifi/planning/`
    pub async fn wifi_planning(&self) -> Result<WifiPlanning, Error> {
        self.authenticated_get(Endpoint::WifiPlanning).await
    }

    /// Turn the planning schedule on or off. Returns the echoed value.
    ///
    /// `PUT wifi/planning/` with `{"use_planning": ...}`
    pub async fn set_wifi_planning(&self, use_planning: bool) -> Result<WifiPlanning, Error> {
        debug!(use_planning, "updating wifi planning");
        self.authenticated_put(Endpoint::WifiPlanning, &WifiPlanning { use_planning })
            .await
    }
}
