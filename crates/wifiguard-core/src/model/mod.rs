// ── Domain model ──
//
// Router payloads mapped into the states the enforcement logic reasons
// about. Consumers (CLI, HTTP trigger) only ever see these types.

pub mod wifi;

pub use wifi::{AccessPoint, PollReport, WifiPlanningState, WifiState};
