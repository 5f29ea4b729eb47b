// wifiguard-core: Keeps the router's WiFi on and its planning off.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod schedule;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{RouterConfig, TlsVerification};
pub use controller::WifiController;
pub use error::CoreError;
pub use model::{AccessPoint, PollReport, WifiPlanningState, WifiState};
pub use schedule::{PollSchedule, run_poll_loop};

// Session-level types consumers need without depending on the api crate.
pub use wifiguard_api::{AppIdentity, AuthorizationStatus, SessionPhase, SessionPolicy};
