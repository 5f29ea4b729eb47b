// Router API endpoint catalog
//
// Every path is relative to the configured base URL
// (e.g. `https://mafreebox.freebox.fr/api/v8/`).

use std::fmt;

/// Logical router operations and their relative API paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET` the login challenge.
    Login,
    /// `POST` the challenge answer to open a session.
    LoginSession,
    /// `POST` to close the current session.
    LoginLogout,
    /// `POST` an app registration request.
    LoginAuthorize,
    /// Global WiFi configuration (`enabled` flag).
    WifiConfig,
    /// Access point list with per-AP status.
    WifiAp,
    /// Planning configuration (`use_planning` flag).
    WifiPlanning,
    /// Planning activity state.
    WifiPlanningState,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "login/",
            Self::LoginSession => "login/session/",
            Self::LoginLogout => "login/logout/",
            Self::LoginAuthorize => "login/authorize/",
            Self::WifiConfig => "wifi/config/",
            Self::WifiAp => "wifi/ap/",
            Self::WifiPlanning => "wifi/planning/",
            Self::WifiPlanningState => "wifi/planning/state/",
        }
    }

    /// Path used to follow a pending app registration.
    pub fn authorize_track(track_id: u64) -> String {
        format!("{}{track_id}", Self::LoginAuthorize.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_relative_with_trailing_slash() {
        for endpoint in [
            Endpoint::Login,
            Endpoint::LoginSession,
            Endpoint::LoginLogout,
            Endpoint::LoginAuthorize,
            Endpoint::WifiConfig,
            Endpoint::WifiAp,
            Endpoint::WifiPlanning,
            Endpoint::WifiPlanningState,
        ] {
            let path = endpoint.path();
            assert!(!path.starts_with('/'), "{path} must be relative");
            assert!(path.ends_with('/'), "{path} must end with a slash");
        }
    }

    #[test]
    fn track_path_appends_id() {
        assert_eq!(Endpoint::authorize_track(42), "login/authorize/42");
    }

    #[test]
    fn display_is_the_path() {
        assert_eq!(Endpoint::WifiPlanningState.to_string(), "wifi/planning/state/");
    }
}
