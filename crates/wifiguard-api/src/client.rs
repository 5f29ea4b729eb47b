// Router HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, the session header, and
// envelope unwrapping. Carries no session state of its own: the
// handshake (auth.rs), registration (registration.rs) and the session
// client (session.rs) all build on these primitives.

use reqwest::header::HeaderValue;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ApiResponse;
use crate::transport::TransportConfig;

/// Header carrying the session token on authenticated requests.
pub const AUTH_HEADER: &str = "X-Fbx-App-Auth";

/// Unauthenticated HTTP client for the router API.
///
/// Every method returns the unwrapped `result` payload; the
/// `{ success, result, msg, error_code }` envelope is checked and
/// stripped before the caller sees it.
#[derive(Debug, Clone)]
pub struct RouterClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RouterClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the versioned API root, e.g.
    /// `https://mafreebox.freebox.fr/api/v8/`. A missing trailing slash is
    /// added so that relative endpoint paths join underneath it.
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Resolve a relative endpoint path against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start a request, attaching the session token when one is given.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let builder = self.http.request(method, url);
        match token {
            Some(token) => {
                let mut value =
                    HeaderValue::from_str(token.expose_secret()).map_err(|e| {
                        Error::Authentication {
                            message: format!("session token is not a valid header value: {e}"),
                        }
                    })?;
                value.set_sensitive(true);
                Ok(builder.header(AUTH_HEADER, value))
            }
            None => Ok(builder),
        }
    }

    /// Send a request and return the envelope's `result`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, Error> {
        let (envelope, body) = self.send_envelope::<T>(builder).await?;
        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "successful response carries no `result`".into(),
            body,
        })
    }

    /// Send a request whose `result` is irrelevant; only `success` counts.
    pub(crate) async fn execute_ack(&self, builder: RequestBuilder) -> Result<(), Error> {
        self.send_envelope::<serde_json::Value>(builder)
            .await
            .map(|_| ())
    }

    /// Send the request and parse the envelope, failing unless `success`.
    ///
    /// The router reports most failures as an envelope with a non-2xx
    /// status (403 for `auth_required`, for instance), so the body is
    /// parsed before the status is judged.
    async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<(ApiResponse<T>, String), Error> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, body = %preview(&body), "router response");

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Error::Api {
                    status: status.as_u16(),
                    code: None,
                    message: format!("HTTP {status}: {}", preview(&body)),
                });
            }
            Err(e) => {
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body,
                });
            }
        };

        if !envelope.success {
            return Err(Error::Api {
                status: status.as_u16(),
                message: envelope
                    .msg
                    .unwrap_or_else(|| "request rejected by router".into()),
                code: envelope.error_code,
            });
        }

        Ok((envelope, body))
    }
}

/// Ensure the base URL ends with `/` so `Url::join` appends instead of
/// replacing the last path segment.
fn normalize_base_url(raw: &Url) -> Url {
    let mut url = raw.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}
