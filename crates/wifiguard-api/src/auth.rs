// Challenge-response authentication
//
// The router never sees the app token: it hands out a one-time
// challenge, and the client answers with HMAC-SHA1(app_token, challenge)
// as lowercase hex. A correct answer yields a session token that goes
// into the `X-Fbx-App-Auth` header of every later request.

use hmac::{Hmac, Mac};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use tracing::debug;

use crate::client::RouterClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::{LoginChallenge, SessionOpened, SessionRequest};

type HmacSha1 = Hmac<Sha1>;

/// How the app introduces itself to the router.
///
/// Sent once during registration; `app_id` and `app_version` are sent
/// again on every login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub device_name: String,
}

/// Credentials for opening sessions: the registered identity plus the
/// app token granted during registration.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_version: String,
    pub app_token: SecretString,
}

impl AppCredentials {
    pub fn new(identity: &AppIdentity, app_token: SecretString) -> Self {
        Self {
            app_id: identity.app_id.clone(),
            app_version: identity.app_version.clone(),
            app_token,
        }
    }
}

/// Answer a login challenge: HMAC-SHA1 keyed with the app token, hex encoded.
pub fn challenge_password(app_token: &SecretString, challenge: &str) -> String {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(app_token.expose_secret().as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(challenge.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Transport problems stay transport problems; anything the router
/// itself refused or garbled becomes an authentication failure.
fn handshake_error(stage: &str, err: Error) -> Error {
    match err {
        transport @ (Error::Transport(_) | Error::InvalidUrl(_) | Error::Tls(_)) => transport,
        Error::Api {
            code: Some(code),
            message,
            ..
        } => Error::Authentication {
            message: format!("{stage} ({code}): {message}"),
        },
        other => Error::Authentication {
            message: format!("{stage}: {other}"),
        },
    }
}

impl RouterClient {
    /// Fetch a fresh one-time login challenge.
    ///
    /// `GET login/`
    pub async fn login_challenge(&self) -> Result<LoginChallenge, Error> {
        let builder = self.request(Method::GET, Endpoint::Login.path(), None)?;
        self.execute(builder)
            .await
            .map_err(|e| handshake_error("could not obtain login challenge", e))
    }

    /// Run the full handshake and return the new session token.
    ///
    /// `GET login/` then `POST login/session/` with
    /// `{app_id, app_version, password}`.
    pub async fn open_session(&self, credentials: &AppCredentials) -> Result<SecretString, Error> {
        let challenge = self.login_challenge().await?;
        debug!(
            logged_in = challenge.logged_in,
            "received login challenge"
        );

        let password = challenge_password(&credentials.app_token, &challenge.challenge);
        let body = SessionRequest {
            app_id: &credentials.app_id,
            app_version: &credentials.app_version,
            password: &password,
        };

        let builder = self
            .request(Method::POST, Endpoint::LoginSession.path(), None)?
            .json(&body);
        let opened: SessionOpened = self
            .execute(builder)
            .await
            .map_err(|e| handshake_error("login rejected", e))?;

        let token = opened
            .session_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "login succeeded but no session token was returned".into(),
            })?;

        debug!("session opened");
        Ok(SecretString::from(token))
    }

    /// Close the session identified by `token`.
    ///
    /// `POST login/logout/`
    pub async fn logout(&self, token: &SecretString) -> Result<(), Error> {
        let builder = self.request(Method::POST, Endpoint::LoginLogout.path(), Some(token))?;
        self.execute_ack(builder).await?;
        debug!("logout complete");
        Ok(())
    }
}
