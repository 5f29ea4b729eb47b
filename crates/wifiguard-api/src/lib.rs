// wifiguard-api: Async Rust client for the Freebox OS local API
//
// `RouterClient` speaks the raw envelope protocol; `SessionClient` adds
// the challenge-response session, the exclusive gate, and the idle
// watchdog on top.

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod registration;
pub mod session;
pub mod transport;
pub mod wifi;

pub use auth::{AppCredentials, AppIdentity, challenge_password};
pub use client::{AUTH_HEADER, RouterClient};
pub use endpoint::Endpoint;
pub use error::Error;
pub use models::{AuthorizationStatus, RawAccessPoint, WifiConfig, WifiPlanning};
pub use registration::PendingRegistration;
pub use session::{SessionClient, SessionId, SessionPhase, SessionPolicy};
pub use transport::{TlsMode, TransportConfig};
