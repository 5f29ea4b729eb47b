use thiserror::Error;

/// Top-level error type for the `wifiguard-api` crate.
///
/// Covers every failure mode of the router API: transport, the login
/// handshake, envelope-level rejections, and response shape mismatches.
/// `wifiguard-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The challenge-response handshake failed or returned no credential.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Router API ──────────────────────────────────────────────────
    /// The router answered with `success: false` (or a non-2xx status).
    #[error("Router API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        /// Router error code, e.g. `auth_required` or `invalid_token`.
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The body was not the JSON we expected, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Extract the router error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_code_is_exposed() {
        let err = Error::Api {
            status: 403,
            code: Some("auth_required".into()),
            message: "Invalid session token, or no session token sent".into(),
        };
        assert_eq!(err.api_error_code(), Some("auth_required"));
    }

    #[test]
    fn shape_errors_carry_no_router_code() {
        let err = Error::Deserialization {
            message: "missing field `result`".into(),
            body: "{}".into(),
        };
        assert_eq!(err.api_error_code(), None);
    }
}
