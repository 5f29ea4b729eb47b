// ── Runtime connection configuration ──
//
// These types describe *how* to reach the router and who we are to it.
// They carry credential data and tuning, but never touch disk: the CLI
// builds a `RouterConfig` from its config layers and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use wifiguard_api::{AppCredentials, AppIdentity, SessionPolicy, TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file (e.g. the router's own root CA).
    CustomCa(PathBuf),
    /// Skip verification. Default: the router serves a private-CA cert.
    #[default]
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to talk to one router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// API base URL, e.g. `https://mafreebox.freebox.fr/api/v8/`.
    pub url: Url,
    pub identity: AppIdentity,
    /// Token granted during registration; the HMAC key for every login.
    pub app_token: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub session: SessionPolicy,
}

impl RouterConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }

    pub fn credentials(&self) -> AppCredentials {
        AppCredentials::new(&self.identity, self.app_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn credentials_carry_identity_and_token() {
        let config = RouterConfig {
            url: Url::parse("https://mafreebox.freebox.fr/api/v8/").expect("valid url"),
            identity: AppIdentity {
                app_id: "fr.wifiguard".into(),
                app_name: "WiFi Guard".into(),
                app_version: "0.1.0".into(),
                device_name: "pi".into(),
            },
            app_token: SecretString::from("secret".to_owned()),
            tls: TlsVerification::CustomCa("/etc/freebox-ca.pem".into()),
            timeout: Duration::from_secs(5),
            session: SessionPolicy::default(),
        };

        let creds = config.credentials();
        assert_eq!(creds.app_id, "fr.wifiguard");
        assert_eq!(creds.app_token.expose_secret(), "secret");

        let transport = config.transport();
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert!(matches!(transport.tls, TlsMode::CustomCa(ref p) if p.ends_with("freebox-ca.pem")));
    }
}
