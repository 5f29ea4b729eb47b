// App registration
//
// One-time flow: ask the router for an app token, then the operator
// confirms physically on the router within a short window. The track id
// lets us follow the pending request until it is granted or refused.

use reqwest::Method;
use secrecy::SecretString;
use tracing::{debug, info};

use crate::auth::AppIdentity;
use crate::client::RouterClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::{AuthorizationProgress, AuthorizationStatus, AuthorizeGranted, AuthorizeRequest};

/// A registration request the router has accepted but the operator has
/// not confirmed yet.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    /// Becomes usable for logins once the status is `granted`.
    pub app_token: SecretString,
    pub track_id: u64,
}

impl RouterClient {
    /// Ask the router to register this app.
    ///
    /// `POST login/authorize/`
    pub async fn request_authorization(
        &self,
        identity: &AppIdentity,
    ) -> Result<PendingRegistration, Error> {
        let body = AuthorizeRequest {
            app_id: &identity.app_id,
            app_name: &identity.app_name,
            app_version: &identity.app_version,
            device_name: &identity.device_name,
        };
        let builder = self
            .request(Method::POST, Endpoint::LoginAuthorize.path(), None)?
            .json(&body);
        let granted: AuthorizeGranted = self.execute(builder).await?;

        info!(track_id = granted.track_id, "registration requested, awaiting confirmation on the router");
        Ok(PendingRegistration {
            app_token: SecretString::from(granted.app_token),
            track_id: granted.track_id,
        })
    }

    /// Check where a registration request stands.
    ///
    /// `GET login/authorize/{track_id}`
    pub async fn authorization_status(&self, track_id: u64) -> Result<AuthorizationStatus, Error> {
        let path = Endpoint::authorize_track(track_id);
        let builder = self.request(Method::GET, &path, None)?;
        let progress: AuthorizationProgress = self.execute(builder).await?;
        debug!(track_id, status = ?progress.status, "registration status");
        Ok(progress.status)
    }
}
