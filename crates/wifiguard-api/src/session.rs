// Authenticated session client
//
// One router session per client, shared by every caller. The session
// slot and its idleness timestamp sit behind a single async mutex (the
// gate): requests, handshakes, closes and the idle watchdog all take it
// before touching session state, so nobody ever sees a half-created or
// half-closed session.
//
//   NoSession ──ensure──▶ Authenticating ──ok──▶ Ready ──close──▶ Closing ──▶ NoSession
//                              │
//                              └──error──▶ NoSession
//
// Each session gets an id and a cancellation token. Its watchdog only
// ever acts on that id, so replacing or closing the session turns any
// stale watchdog into a no-op.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::auth::AppCredentials;
use crate::client::RouterClient;
use crate::endpoint::Endpoint;
use crate::error::Error;

/// The router drops sessions after this much inactivity; we retire ours
/// at the same mark.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// How often the watchdog looks at the session's idle time.
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(10);

/// Idle-expiry tuning for the session watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Close the session once it has been idle this long.
    pub idle_timeout: Duration,
    /// Period between watchdog checks.
    pub watchdog_interval: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
        }
    }
}

/// Identity of one handshake. Strictly increasing per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of the shared session, observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoSession,
    Authenticating,
    Ready,
    Closing,
}

// ── Gate contents ────────────────────────────────────────────────

struct Session {
    id: SessionId,
    token: SecretString,
    last_used: Instant,
    /// Fires when this session is closed or replaced; stops its watchdog.
    retire: CancellationToken,
}

#[derive(Default)]
struct Gate {
    session: Option<Session>,
    issued: u64,
}

/// What the watchdog should do with the session it is watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// The watched session is no longer the current one.
    Gone,
    Keep { idle: Duration },
    Expire { idle: Duration },
}

fn judge(
    session: Option<&Session>,
    watched: SessionId,
    now: Instant,
    idle_timeout: Duration,
) -> Verdict {
    match session {
        Some(session) if session.id == watched => {
            let idle = now.saturating_duration_since(session.last_used);
            if idle >= idle_timeout {
                Verdict::Expire { idle }
            } else {
                Verdict::Keep { idle }
            }
        }
        _ => Verdict::Gone,
    }
}

// ── SessionClient ────────────────────────────────────────────────

/// Authenticated client for the router API.
///
/// Cheaply cloneable via `Arc<SessionInner>`; clones share the same
/// session and gate. Sessions are opened lazily by the first
/// authenticated call, reused while in use, and closed by a background
/// watchdog after [`SessionPolicy::idle_timeout`] without traffic.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    router: RouterClient,
    credentials: AppCredentials,
    policy: SessionPolicy,
    gate: Mutex<Gate>,
    phase: watch::Sender<SessionPhase>,
}

impl SessionClient {
    /// Create a client. Does NOT authenticate; the first authenticated
    /// call (or [`ensure_session()`](Self::ensure_session)) does.
    pub fn new(router: RouterClient, credentials: AppCredentials, policy: SessionPolicy) -> Self {
        let (phase, _) = watch::channel(SessionPhase::NoSession);
        Self {
            inner: Arc::new(SessionInner {
                router,
                credentials,
                policy,
                gate: Mutex::new(Gate::default()),
                phase,
            }),
        }
    }

    /// The unauthenticated client underneath (registration flows use it).
    pub fn router(&self) -> &RouterClient {
        &self.inner.router
    }

    // ── Observation ──────────────────────────────────────────────

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase.borrow()
    }

    /// Subscribe to lifecycle phase changes.
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase.subscribe()
    }

    /// Whether a session is currently held. Waits for the gate.
    pub async fn is_active(&self) -> bool {
        self.inner.gate.lock().await.session.is_some()
    }

    /// Time since the current session was last used, if there is one.
    pub async fn idle_time(&self) -> Option<Duration> {
        let gate = self.inner.gate.lock().await;
        gate.session.as_ref().map(|session| session.last_used.elapsed())
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Return the current session, opening one if none exists.
    ///
    /// Callers that arrive while another caller is authenticating wait
    /// on the gate and then reuse the fresh session.
    pub async fn ensure_session(&self) -> Result<SessionId, Error> {
        let mut gate = self.inner.gate.lock().await;
        Ok(self.ensure_locked(&mut gate).await?.id)
    }

    /// Run a new handshake and store the resulting session.
    ///
    /// An existing session is closed first (best-effort logout) so the
    /// router never holds two of ours. On failure nothing is stored.
    pub async fn create_session(&self) -> Result<SessionId, Error> {
        let mut gate = self.inner.gate.lock().await;
        self.close_locked(&mut gate).await;
        self.open_locked(&mut gate).await
    }

    /// Log out and forget the current session. No-op without one.
    ///
    /// Logout failures are logged and swallowed; the session is cleared
    /// regardless.
    pub async fn close_session(&self) {
        let mut gate = self.inner.gate.lock().await;
        self.close_locked(&mut gate).await;
    }

    // ── Authenticated requests ───────────────────────────────────

    /// `GET` an endpoint with the session token attached.
    pub async fn authenticated_get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<T, Error> {
        self.dispatch(Method::GET, endpoint, None).await
    }

    /// `PUT` a JSON body to an endpoint with the session token attached.
    pub async fn authenticated_put<T, B>(&self, endpoint: Endpoint, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(body)?;
        self.dispatch(Method::PUT, endpoint, Some(payload)).await
    }

    /// `POST` a JSON body to an endpoint with the session token attached.
    pub async fn authenticated_post<T, B>(&self, endpoint: Endpoint, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(body)?;
        self.dispatch(Method::POST, endpoint, Some(payload)).await
    }

    /// Send one request under the gate.
    ///
    /// Failures propagate untouched and leave the session in place;
    /// retiring sessions is the watchdog's job. Any answer from the
    /// router, a refusal included, counts as use of the session.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: Endpoint,
        payload: Option<String>,
    ) -> Result<T, Error> {
        let mut gate = self.inner.gate.lock().await;
        let session = self.ensure_locked(&mut gate).await?;
        trace!(session = %session.id, %endpoint, "gate acquired");

        let mut builder =
            self.inner
                .router
                .request(method, endpoint.path(), Some(&session.token))?;
        if let Some(payload) = payload {
            debug!(%endpoint, %payload, "request payload");
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let result = self.inner.router.execute(builder).await;

        let answered = !matches!(
            result,
            Err(Error::Transport(_) | Error::InvalidUrl(_) | Error::Tls(_))
        );
        if answered {
            if let Some(session) = gate.session.as_mut() {
                session.last_used = Instant::now();
            }
        }
        result
    }

    // ── Gate-held helpers ────────────────────────────────────────

    async fn ensure_locked<'g>(&self, gate: &'g mut Gate) -> Result<&'g Session, Error> {
        if gate.session.is_none() {
            self.open_locked(gate).await?;
        }
        gate.session.as_ref().ok_or_else(|| Error::Authentication {
            message: "no session available after login".into(),
        })
    }

    async fn open_locked(&self, gate: &mut Gate) -> Result<SessionId, Error> {
        self.set_phase(SessionPhase::Authenticating);

        let token = match self.inner.router.open_session(&self.inner.credentials).await {
            Ok(token) => token,
            Err(e) => {
                self.set_phase(SessionPhase::NoSession);
                warn!(error = %e, "session handshake failed");
                return Err(e);
            }
        };

        gate.issued += 1;
        let id = SessionId(gate.issued);
        let retire = CancellationToken::new();
        let previous = gate.session.replace(Session {
            id,
            token,
            last_used: Instant::now(),
            retire: retire.clone(),
        });
        if let Some(previous) = previous {
            previous.retire.cancel();
        }

        tokio::spawn(watchdog(
            Arc::downgrade(&self.inner),
            id,
            retire,
            self.inner.policy,
        ));

        self.set_phase(SessionPhase::Ready);
        info!(session = %id, "router session opened");
        Ok(id)
    }

    async fn close_locked(&self, gate: &mut Gate) {
        let Some(session) = gate.session.take() else {
            return;
        };

        self.set_phase(SessionPhase::Closing);
        session.retire.cancel();

        match self.inner.router.logout(&session.token).await {
            Ok(()) => info!(session = %session.id, "router session closed"),
            Err(e) => warn!(
                session = %session.id,
                error = %e,
                "logout failed, session discarded anyway"
            ),
        }

        self.set_phase(SessionPhase::NoSession);
    }

    fn set_phase(&self, phase: SessionPhase) {
        let previous = self.inner.phase.send_replace(phase);
        if previous != phase {
            trace!(?previous, ?phase, "session phase changed");
        }
    }
}

// ── Watchdog ─────────────────────────────────────────────────────

/// Close the watched session once it has been idle too long.
///
/// Holds only a weak reference, so dropping every `SessionClient` also
/// ends the task at its next tick.
async fn watchdog(
    inner: Weak<SessionInner>,
    watched: SessionId,
    retire: CancellationToken,
    policy: SessionPolicy,
) {
    let mut ticker = tokio::time::interval_at(
        Instant::now() + policy.watchdog_interval,
        policy.watchdog_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = retire.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(inner) = inner.upgrade() else { break };
        let client = SessionClient { inner };
        let mut gate = client.inner.gate.lock().await;

        match judge(
            gate.session.as_ref(),
            watched,
            Instant::now(),
            policy.idle_timeout,
        ) {
            Verdict::Gone => break,
            Verdict::Keep { idle } => {
                trace!(session = %watched, idle_secs = idle.as_secs(), "session still in use");
            }
            Verdict::Expire { idle } => {
                info!(
                    session = %watched,
                    idle_secs = idle.as_secs(),
                    "closing session after inactivity"
                );
                client.close_locked(&mut gate).await;
                break;
            }
        }
    }

    debug!(session = %watched, "watchdog stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_used_at(id: u64, last_used: Instant) -> Session {
        Session {
            id: SessionId(id),
            token: SecretString::from("token".to_owned()),
            last_used,
            retire: CancellationToken::new(),
        }
    }

    #[test]
    fn request_inside_window_postpones_expiry() {
        let t0 = Instant::now();
        let timeout = Duration::from_secs(60);

        // Request at t=55 resets the idle clock.
        let session = session_used_at(1, t0 + Duration::from_secs(55));

        assert_eq!(
            judge(Some(&session), SessionId(1), t0 + Duration::from_secs(60), timeout),
            Verdict::Keep {
                idle: Duration::from_secs(5)
            }
        );
        assert_eq!(
            judge(Some(&session), SessionId(1), t0 + Duration::from_secs(116), timeout),
            Verdict::Expire {
                idle: Duration::from_secs(61)
            }
        );
    }

    #[test]
    fn expiry_is_inclusive_of_the_threshold() {
        let t0 = Instant::now();
        let session = session_used_at(1, t0);
        let verdict = judge(
            Some(&session),
            SessionId(1),
            t0 + Duration::from_secs(60),
            Duration::from_secs(60),
        );
        assert!(matches!(verdict, Verdict::Expire { .. }));
    }

    #[test]
    fn stale_watchdog_ignores_replacement_session() {
        let t0 = Instant::now();
        let replacement = session_used_at(2, t0);
        let verdict = judge(
            Some(&replacement),
            SessionId(1),
            t0 + Duration::from_secs(600),
            Duration::from_secs(60),
        );
        assert_eq!(verdict, Verdict::Gone);
        assert_eq!(
            judge(None, SessionId(1), t0, Duration::from_secs(60)),
            Verdict::Gone
        );
    }

    #[test]
    fn session_ids_display_with_hash() {
        assert_eq!(SessionId(7).to_string(), "#7");
        assert!(SessionId(1) < SessionId(2));
    }
}
