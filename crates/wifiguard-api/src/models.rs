// Router API wire types
//
// Every response is wrapped in `{ success, result?, msg?, error_code? }`.
// Payload structs only name the fields we act on; the router sends many
// more and serde ignores them.

use serde::{Deserialize, Serialize};

/// The response envelope shared by every router endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

// ── Login ───────────────────────────────────────────────────────────

/// `GET login/` result.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginChallenge {
    pub challenge: String,
    #[serde(default)]
    pub logged_in: bool,
}

/// `POST login/session/` body.
#[derive(Debug, Serialize)]
pub(crate) struct SessionRequest<'a> {
    pub app_id: &'a str,
    pub app_version: &'a str,
    pub password: &'a str,
}

/// `POST login/session/` result.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionOpened {
    #[serde(default)]
    pub session_token: Option<String>,
}

// ── Registration ────────────────────────────────────────────────────

/// `POST login/authorize/` body.
#[derive(Debug, Serialize)]
pub(crate) struct AuthorizeRequest<'a> {
    pub app_id: &'a str,
    pub app_name: &'a str,
    pub app_version: &'a str,
    pub device_name: &'a str,
}

/// `POST login/authorize/` result.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthorizeGranted {
    pub app_token: String,
    pub track_id: u64,
}

/// Progress of a pending app registration, as reported by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// The track id is unknown to the router.
    Unknown,
    /// Waiting for the operator to press the router's button.
    Pending,
    /// The operator did not answer in time.
    Timeout,
    /// The app token is now valid.
    Granted,
    /// The operator refused the app.
    Denied,
}

/// `GET login/authorize/{track_id}` result.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationProgress {
    pub status: AuthorizationStatus,
}

// ── WiFi ────────────────────────────────────────────────────────────

/// `wifi/config/` payload. Also used as the PUT body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WifiConfig {
    pub enabled: bool,
}

/// One entry of `GET wifi/ap/`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAccessPoint {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub status: RawApStatus,
}

/// The `status` object of an access point.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawApStatus {
    /// `active`, `disabled`, `disabled_planning`, `failed`, `starting`, ...
    pub state: String,
}

/// `wifi/planning/` payload. Also used as the PUT body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WifiPlanning {
    pub use_planning: bool,
}
