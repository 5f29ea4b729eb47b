// HTTP transport to the router.
//
// The session client, the handshake and the registration flow all talk
// to the same box on the local network, so TLS trust, timeouts and the
// headers the router expects are set up here once.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Error;

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("wifiguard/", env!("CARGO_PKG_VERSION"));

/// Upper bound on establishing a connection. The router sits on the LAN,
/// so anything slower means it is unreachable.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The router drops keep-alive connections after a short while; reusing
/// one it already closed costs a failed request.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// How the router's certificate is checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Trust the root CAs in this PEM file. Freebox publishes an RSA and
    /// an ECC root; a bundle holding both is accepted.
    CustomCa(PathBuf),
    /// Accept any certificate (the router ships a private CA).
    DangerAcceptInvalid,
}

/// Transport settings shared by every client built for the router.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout. Also caps the connect timeout.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout.min(MAX_CONNECT_TIMEOUT))
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                for cert in load_root_certs(path)? {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn load_root_certs(path: &Path) -> Result<Vec<reqwest::Certificate>, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {}: {e}", path.display())))?;
    let certs = reqwest::Certificate::from_pem_bundle(&pem)
        .map_err(|e| Error::Tls(format!("invalid CA cert {}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(Error::Tls(format!(
            "no certificate found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/freebox-ca.pem")),
            timeout: Duration::from_secs(5),
        };
        let err = config.build_client().expect_err("CA file does not exist");
        assert!(matches!(
            err,
            Error::Tls(ref msg) if msg.contains("failed to read CA cert")
                && msg.contains("freebox-ca.pem")
        ));
    }

    #[test]
    fn ca_file_without_certificates_is_rejected() {
        let dir = std::env::temp_dir().join(format!("wifiguard-ca-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("empty.pem");
        std::fs::write(&path, "# nothing here\n").expect("write");

        let config = TransportConfig {
            tls: TlsMode::CustomCa(path),
            timeout: Duration::from_secs(5),
        };
        let err = config.build_client().expect_err("no certificate");
        assert!(matches!(err, Error::Tls(ref msg) if msg.contains("empty.pem")));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn requests_identify_the_agent_and_ask_for_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v8/login/"))
            .and(header("user-agent", USER_AGENT))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let http = TransportConfig::default().build_client().expect("client");
        let response = http
            .get(format!("{}/api/v8/login/", server.uri()))
            .send()
            .await
            .expect("request");
        assert!(response.status().is_success());
    }
}
