// ── WiFi domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use wifiguard_api::RawAccessPoint;

/// Observed state of the WiFi radio. Recomputed on every poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WifiState {
    Active,
    /// Active, but a planning schedule may switch it off.
    ActivePlanned,
    Inactive,
    Disabled,
    /// Switched off by the planning schedule.
    DisabledPlanning,
    Failed,
    Unknown,
}

impl WifiState {
    /// Map an access point's raw `status.state` string.
    ///
    /// Transitional router states (`starting`, `no_param`, ...) are
    /// `Unknown`.
    pub fn from_status(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "disabled" => Self::Disabled,
            "disabled_planning" => Self::DisabledPlanning,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Overall radio state from the access point list, before any
    /// planning upgrade.
    ///
    /// Access points are inspected in order; the first one that is up or
    /// down decides. Only if none does, a `failed` one makes the whole
    /// radio `Failed`.
    pub fn from_access_points(access_points: &[AccessPoint]) -> Self {
        let decisive = access_points.iter().find_map(|ap| match ap.state {
            Self::Active => Some(Self::Active),
            Self::Inactive | Self::Disabled | Self::DisabledPlanning => Some(Self::Inactive),
            _ => None,
        });

        decisive.unwrap_or_else(|| {
            if access_points.iter().any(|ap| ap.state == Self::Failed) {
                Self::Failed
            } else {
                Self::Unknown
            }
        })
    }

    /// Whether the radio is broadcasting.
    pub fn is_up(self) -> bool {
        matches!(self, Self::Active | Self::ActivePlanned)
    }
}

/// Whether the router's time-based WiFi schedule is in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WifiPlanningState {
    Enabled,
    Disabled,
    Unknown,
}

impl From<bool> for WifiPlanningState {
    fn from(use_planning: bool) -> Self {
        if use_planning {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// One access point as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub id: u32,
    pub name: Option<String>,
    /// The router's own status string, kept for display.
    pub status: String,
    pub state: WifiState,
}

impl From<RawAccessPoint> for AccessPoint {
    fn from(raw: RawAccessPoint) -> Self {
        let state = WifiState::from_status(&raw.status.state);
        Self {
            id: raw.id,
            name: raw.name,
            status: raw.status.state,
            state,
        }
    }
}

/// Outcome of one corrective poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollReport {
    /// State observed before any correction.
    pub wifi_state: WifiState,
    /// Planning state read after the correction attempt.
    pub wifi_planning_state: WifiPlanningState,
    /// `Some(outcome)` if activation was attempted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wifi_activated: Option<bool>,
    /// `Some(outcome)` if disabling planning was attempted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub planning_disabled: Option<bool>,
    pub checked_at: DateTime<Utc>,
}

impl PollReport {
    /// Whether every attempted correction went through.
    pub fn corrections_succeeded(&self) -> bool {
        self.wifi_activated.unwrap_or(true) && self.planning_disabled.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn ap(id: u32, status: &str) -> AccessPoint {
        AccessPoint {
            id,
            name: None,
            status: status.into(),
            state: WifiState::from_status(status),
        }
    }

    #[test]
    fn raw_status_mapping() {
        assert_eq!(WifiState::from_status("active"), WifiState::Active);
        assert_eq!(WifiState::from_status("disabled_planning"), WifiState::DisabledPlanning);
        assert_eq!(WifiState::from_status("failed"), WifiState::Failed);
        assert_eq!(WifiState::from_status("starting"), WifiState::Unknown);
        assert_eq!(WifiState::from_status(""), WifiState::Unknown);
    }

    #[test]
    fn first_decisive_access_point_wins() {
        let aps = [ap(0, "starting"), ap(1, "disabled"), ap(2, "active")];
        assert_eq!(WifiState::from_access_points(&aps), WifiState::Inactive);

        let aps = [ap(0, "failed"), ap(1, "active")];
        assert_eq!(WifiState::from_access_points(&aps), WifiState::Active);
    }

    #[test]
    fn all_down_variants_collapse_to_inactive() {
        for status in ["inactive", "disabled", "disabled_planning"] {
            assert_eq!(
                WifiState::from_access_points(&[ap(0, status)]),
                WifiState::Inactive,
                "status {status}"
            );
        }
    }

    #[test]
    fn undecided_access_points() {
        assert_eq!(WifiState::from_access_points(&[]), WifiState::Unknown);
        assert_eq!(
            WifiState::from_access_points(&[ap(0, "starting"), ap(1, "failed")]),
            WifiState::Failed
        );
    }

    #[test]
    fn states_render_snake_case() {
        assert_eq!(WifiState::ActivePlanned.to_string(), "active_planned");
        assert_eq!(WifiState::from_str("disabled_planning").ok(), Some(WifiState::DisabledPlanning));
        assert_eq!(
            serde_json::to_value(WifiPlanningState::Enabled).ok(),
            Some(serde_json::json!("enabled"))
        );
    }

    #[test]
    fn corrections_succeeded_ignores_unattempted() {
        let report = PollReport {
            wifi_state: WifiState::Active,
            wifi_planning_state: WifiPlanningState::Disabled,
            wifi_activated: None,
            planning_disabled: Some(true),
            checked_at: Utc::now(),
        };
        assert!(report.corrections_succeeded());

        let failed = PollReport {
            wifi_activated: Some(false),
            ..report
        };
        assert!(!failed.corrections_succeeded());
    }
}
