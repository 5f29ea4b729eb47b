//! Configuration for wifiguard.
//!
//! TOML file, `WIFIGUARD_*` environment, and the bare variable names
//! older deployments use (`URL_BASE`, `TOKEN`, ...), layered with figment.
//! App token resolution (env → keyring → plaintext) and translation to
//! `wifiguard_core::RouterConfig` live here too.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wifiguard_core::{AppIdentity, PollSchedule, RouterConfig, SessionPolicy, TlsVerification};

/// Keyring service and entry holding the app token.
pub const KEYRING_SERVICE: &str = "wifiguard";
pub const KEYRING_ENTRY: &str = "app-token";

/// Bare environment names and the config keys they feed. All of them
/// hold strings; `TRACK_ID` is read separately.
const BARE_ENV: &[(&str, &str)] = &[
    ("URL_BASE", "router.url"),
    ("APP_ID", "router.app_id"),
    ("APP_NAME", "router.app_name"),
    ("APP_VERSION", "router.app_version"),
    ("DEVICE_NAME", "router.device_name"),
    ("TOKEN", "router.app_token"),
];

/// String settings under `WIFIGUARD_`. Their values are taken verbatim
/// instead of going through figment's value parser, which would read
/// `1234` as an integer and `1.10` as the float `1.1`.
const STRING_ENV: &[(&str, &str)] = &[
    ("ROUTER__URL", "router.url"),
    ("ROUTER__APP_ID", "router.app_id"),
    ("ROUTER__APP_NAME", "router.app_name"),
    ("ROUTER__APP_VERSION", "router.app_version"),
    ("ROUTER__DEVICE_NAME", "router.device_name"),
    ("ROUTER__APP_TOKEN", "router.app_token"),
    ("ROUTER__APP_TOKEN_ENV", "router.app_token_env"),
    ("ROUTER__CA_CERT", "router.ca_cert"),
    ("SERVER__BIND", "server.bind"),
];

/// Variables that set the app token directly, highest priority first.
const TOKEN_ENV: &[&str] = &["TOKEN", "WIFIGUARD_ROUTER__APP_TOKEN"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{field}'")]
    Missing { field: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// How to reach the router and who we are to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouterSection {
    /// API base URL, e.g. "https://mafreebox.freebox.fr/api/v8/".
    pub url: Option<String>,

    #[serde(default = "default_app_id")]
    pub app_id: String,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_app_version")]
    pub app_version: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// App token (plaintext, prefer keyring or env var).
    pub app_token: Option<String>,

    /// Environment variable name containing the app token.
    pub app_token_env: Option<String>,

    /// Track id from registration.
    pub track_id: Option<u64>,

    /// Skip TLS verification. Unset means skip unless `ca_cert` is given.
    pub insecure: Option<bool>,

    /// Path to the router's CA certificate.
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            url: None,
            app_id: default_app_id(),
            app_name: default_app_name(),
            app_version: default_app_version(),
            device_name: default_device_name(),
            app_token: None,
            app_token_env: None,
            track_id: None,
            insecure: None,
            ca_cert: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_app_id() -> String {
    "fr.wifiguard".into()
}
fn default_app_name() -> String {
    "WiFi Guard".into()
}
fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}
fn default_device_name() -> String {
    "wifiguard".into()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSection {
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_watchdog_interval_secs")]
    pub watchdog_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            watchdog_interval_secs: default_watchdog_interval_secs(),
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    60
}
fn default_watchdog_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScheduleSection {
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u32,
    #[serde(default = "default_offset_minutes")]
    pub offset_minutes: u32,
    #[serde(default)]
    pub run_on_start: bool,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            period_minutes: default_period_minutes(),
            offset_minutes: default_offset_minutes(),
            run_on_start: false,
        }
    }
}

fn default_period_minutes() -> u32 {
    30
}
fn default_offset_minutes() -> u32 {
    29
}

/// The HTTP trigger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_server_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            enabled: default_server_enabled(),
            bind: default_bind(),
        }
    }
}

fn default_server_enabled() -> bool {
    true
}
fn default_bind() -> String {
    "0.0.0.0:8000".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("fr", "wifiguard", "wifiguard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wifiguard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The provider stack, lowest priority first. `path` overrides the
/// platform config file. Bare names beat their `WIFIGUARD_` forms.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let verbatim: Vec<&str> = STRING_ENV.iter().map(|(name, _)| *name).collect();

    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WIFIGUARD_").ignore(&verbatim).split("__"))
        .merge(verbatim_env(
            STRING_ENV
                .iter()
                .map(|(name, key)| (format!("WIFIGUARD_{name}"), *key)),
        ))
        .merge(
            Env::raw()
                .only(&["TRACK_ID"])
                .map(|_| "router.track_id".into()),
        )
        .merge(verbatim_env(
            BARE_ENV.iter().map(|(name, key)| ((*name).to_owned(), *key)),
        ))
}

/// One string value per variable that is set, keyed by its config path.
fn verbatim_env<'a>(vars: impl IntoIterator<Item = (String, &'a str)>) -> Figment {
    vars.into_iter()
        .fold(Figment::new(), |fig, (name, key)| match std::env::var(&name) {
            Ok(value) => fig.merge(Serialized::default(key, value)),
            Err(_) => fig,
        })
}

/// Load the full Config from defaults, file, and environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    Ok(config)
}

/// Load only defaults and the file, ignoring the environment. Used
/// before rewriting the file so env values never leak into it.
pub fn load_file_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the platform path).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}

/// A commented starter file with every default spelled out.
pub fn starter_config(url: Option<&str>) -> Result<String, ConfigError> {
    let mut cfg = Config::default();
    cfg.router.url = url.map(str::to_owned);
    let body = toml::to_string_pretty(&cfg)?;

    let mut out = String::from(
        "# wifiguard configuration\n\
         #\n\
         # Every key can be overridden with WIFIGUARD_<SECTION>__<KEY>,\n\
         # e.g. WIFIGUARD_ROUTER__URL. Run `wifiguard register` to obtain\n\
         # an app token; it is stored in the OS keyring when possible.\n\n",
    );
    if url.is_none() {
        out.push_str("# [router]\n# url = \"https://mafreebox.freebox.fr/api/v8/\"\n\n");
    }
    out.push_str(&body);
    Ok(out)
}

/// Copy of `cfg` safe to print.
pub fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.router.app_token.is_some() {
        shown.router.app_token = Some("********".into());
    }
    shown
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the app token: `app_token_env` variable, then a token set
/// directly in the environment, then the OS keyring, then plaintext
/// config.
pub fn resolve_app_token(router: &RouterSection) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = router.app_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. TOKEN or WIFIGUARD_ROUTER__APP_TOKEN
    if let Some(val) = TOKEN_ENV.iter().find_map(|name| std::env::var(name).ok()) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref token) = router.app_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::Missing {
        field: "router.app_token".into(),
    })
}

/// Save the app token in the OS keyring.
pub fn store_app_token(token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)?;
    entry.set_password(token.expose_secret())?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

pub fn identity(router: &RouterSection) -> AppIdentity {
    AppIdentity {
        app_id: router.app_id.clone(),
        app_name: router.app_name.clone(),
        app_version: router.app_version.clone(),
        device_name: router.device_name.clone(),
    }
}

/// The router URL, required and validated.
pub fn router_url(router: &RouterSection) -> Result<url::Url, ConfigError> {
    let raw = router.url.as_deref().ok_or_else(|| ConfigError::Missing {
        field: "router.url".into(),
    })?;
    raw.parse().map_err(|e| ConfigError::Validation {
        field: "router.url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

pub fn tls_verification(router: &RouterSection) -> TlsVerification {
    match (router.insecure, &router.ca_cert) {
        (Some(true), _) | (None, None) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
    }
}

pub fn session_policy(session: &SessionSection) -> Result<SessionPolicy, ConfigError> {
    if session.idle_timeout_secs == 0 || session.watchdog_interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "session".into(),
            reason: "idle timeout and watchdog interval must be positive".into(),
        });
    }
    Ok(SessionPolicy {
        idle_timeout: Duration::from_secs(session.idle_timeout_secs),
        watchdog_interval: Duration::from_secs(session.watchdog_interval_secs),
    })
}

pub fn poll_schedule(schedule: &ScheduleSection) -> Result<PollSchedule, ConfigError> {
    PollSchedule::new(
        schedule.period_minutes,
        schedule.offset_minutes,
        schedule.run_on_start,
    )
    .map_err(|e| ConfigError::Validation {
        field: "schedule".into(),
        reason: e.to_string(),
    })
}

/// Build a `RouterConfig`. Missing URL or token is an error.
pub fn to_router_config(cfg: &Config) -> Result<RouterConfig, ConfigError> {
    let url = router_url(&cfg.router)?;
    let app_token = resolve_app_token(&cfg.router)?;

    Ok(RouterConfig {
        url,
        identity: identity(&cfg.router),
        app_token,
        tls: tls_verification(&cfg.router),
        timeout: Duration::from_secs(cfg.router.timeout_secs),
        session: session_policy(&cfg.session)?,
    })
}
