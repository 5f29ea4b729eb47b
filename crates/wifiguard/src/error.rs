//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wifiguard_config::ConfigError;
use wifiguard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(wifiguard::connection_failed),
        help(
            "Check that the router is reachable from this machine.\n\
             URL: {url}\n\
             Try: wifiguard status --insecure -v"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wifiguard::auth_failed),
        help(
            "The app token may have been revoked on the router.\n\
             Run: wifiguard register"
        )
    )]
    AuthFailed { message: String },

    #[error("No app token configured")]
    #[diagnostic(
        code(wifiguard::no_credentials),
        help(
            "Register once with: wifiguard register\n\
             Or set TOKEN / router.app_token_env, or router.app_token in {path}"
        )
    )]
    NoCredentials { path: String },

    // ── Router ───────────────────────────────────────────────────────
    #[error("Router refused the operation: {message}")]
    #[diagnostic(
        code(wifiguard::rejected),
        help(
            "Grant the app the \"Modification des réglages de la Freebox\" permission\n\
             in Freebox OS (Paramètres > Gestion des accès > Applications)."
        )
    )]
    Rejected { message: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(wifiguard::api_error))]
    ApiError { code: String, message: String },

    #[error("The router did not confirm: {action}")]
    #[diagnostic(
        code(wifiguard::not_confirmed),
        help("Run with -v to see the router's answer.")
    )]
    NotConfirmed { action: String },

    // ── Registration ─────────────────────────────────────────────────
    #[error("Registration was refused on the router")]
    #[diagnostic(code(wifiguard::registration_denied))]
    RegistrationDenied,

    #[error("Registration was not confirmed within {seconds}s")]
    #[diagnostic(
        code(wifiguard::registration_timeout),
        help("Run `wifiguard register` again and press the button on the router's front panel.")
    )]
    RegistrationTimeout { seconds: u64 },

    #[error("The router no longer knows registration request {track_id}")]
    #[diagnostic(code(wifiguard::registration_unknown))]
    RegistrationUnknown { track_id: u64 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wifiguard::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting '{field}'")]
    #[diagnostic(
        code(wifiguard::missing_setting),
        help(
            "Create a config with: wifiguard config init --url <URL>\n\
             Expected at: {path}\n\
             Or set the matching environment variable (e.g. URL_BASE)."
        )
    )]
    MissingSetting { field: String, path: String },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(code(wifiguard::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(wifiguard::config))]
    Config(ConfigError),

    // ── Server ───────────────────────────────────────────────────────
    #[error("HTTP trigger failed on {bind}")]
    #[diagnostic(code(wifiguard::server))]
    Server {
        bind: String,
        #[source]
        source: std::io::Error,
    },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Server { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::RegistrationDenied => {
                exit_code::AUTH
            }
            Self::Rejected { .. } => exit_code::PERMISSION,
            Self::RegistrationTimeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::MissingSetting { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| format!("http {s}")))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

impl From<wifiguard_api::Error> for CliError {
    fn from(err: wifiguard_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = wifiguard_config::config_path().display().to_string();
        match err {
            ConfigError::Missing { field } if field == "router.app_token" => {
                CliError::NoCredentials { path }
            }
            ConfigError::Missing { field } => CliError::MissingSetting { field, path },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_exits_with_config_code() {
        let err = CliError::from(ConfigError::Missing {
            field: "router.url".into(),
        });
        assert!(matches!(err, CliError::MissingSetting { .. }));
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn missing_token_is_an_auth_problem() {
        let err = CliError::from(ConfigError::Missing {
            field: "router.app_token".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn rejection_maps_to_permission() {
        let err = CliError::from(CoreError::Rejected {
            message: "insufficient_rights".into(),
        });
        assert_eq!(err.exit_code(), exit_code::PERMISSION);
    }
}
