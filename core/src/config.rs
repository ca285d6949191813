use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config_types::FormsToml;
use crate::config_types::HttpToml;
use crate::config_types::InactivityToml;
use crate::config_types::NotificationsToml;
use crate::config_types::SearchToml;
use crate::error::Result;
use crate::error::UiErr;

pub const CONFIG_TOML_FILE: &str = "config.toml";

const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_MIN_QUERY_CHARS: usize = 2;
const DEFAULT_NOTIFICATION_TTL_MS: u64 = 5_000;
const DEFAULT_MAX_VISIBLE_NOTIFICATIONS: usize = 5;
const DEFAULT_REDIRECT_DELAY_MS: u64 = 1_000;
const DEFAULT_PROCESSING_LABEL: &str = "Processing...";
const DEFAULT_INACTIVITY_SECS: u64 = 30 * 60;
const DEFAULT_ACTIVITY_THROTTLE_MS: u64 = 1_000;
const DEFAULT_LOGOUT_PATH: &str = "/logout";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Page the controller is mounted on. Relative search endpoints and form
    /// actions resolve against it, and forms without an action post to it.
    pub base_url: Url,

    /// Directory holding `config.toml`, local storage and logs.
    pub edu_home: PathBuf,

    pub search: SearchConfig,
    pub notifications: NotificationsConfig,
    pub forms: FormsConfig,
    pub inactivity: InactivityConfig,

    /// `None` means requests never time out.
    pub http_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub notify_on_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationsConfig {
    pub ttl: Duration,
    pub max_visible: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormsConfig {
    pub redirect_delay: Duration,
    pub processing_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InactivityConfig {
    pub timeout: Duration,
    pub activity_throttle: Duration,
    pub logout_path: String,
}

/// Base config deserialized from `<edu_home>/config.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    pub base_url: Option<String>,

    #[serde(default)]
    pub search: SearchToml,

    #[serde(default)]
    pub notifications: NotificationsToml,

    #[serde(default)]
    pub forms: FormsToml,

    #[serde(default)]
    pub inactivity: InactivityToml,

    #[serde(default)]
    pub http: HttpToml,
}

/// Optional overrides supplied by the embedding front-end. These win over
/// both `config.toml` and `-c key=value` pairs.
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub edu_home: Option<PathBuf>,
}

impl Config {
    /// Load `config.toml` from the home directory, apply `-c key=value`
    /// overrides on the raw TOML tree, then the typed overrides.
    pub fn load_with_cli_overrides(
        cli_overrides: Vec<(String, toml::Value)>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let edu_home = match overrides.edu_home.clone() {
            Some(home) => home,
            None => find_edu_home()?,
        };

        let mut root_value = load_config_as_toml(&edu_home)?;
        for (path, value) in cli_overrides.into_iter() {
            apply_toml_override(&mut root_value, &path, value)?;
        }
        let cfg: ConfigToml = root_value.try_into()?;

        Self::load_from_base_config_with_overrides(cfg, overrides, edu_home)
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        edu_home: PathBuf,
    ) -> Result<Self> {
        let ConfigOverrides {
            base_url,
            edu_home: _,
        } = overrides;

        let base_url = base_url
            .or(cfg.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)?;

        let search = SearchConfig {
            debounce: Duration::from_millis(cfg.search.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)),
            min_query_chars: cfg
                .search
                .min_query_chars
                .unwrap_or(DEFAULT_MIN_QUERY_CHARS),
            notify_on_error: cfg.search.notify_on_error.unwrap_or(false),
        };

        let notifications = NotificationsConfig {
            ttl: Duration::from_millis(
                cfg.notifications
                    .ttl_ms
                    .unwrap_or(DEFAULT_NOTIFICATION_TTL_MS),
            ),
            // A zero cap would evict every card as it is shown.
            max_visible: cfg
                .notifications
                .max_visible
                .unwrap_or(DEFAULT_MAX_VISIBLE_NOTIFICATIONS)
                .max(1),
        };

        let forms = FormsConfig {
            redirect_delay: Duration::from_millis(
                cfg.forms
                    .redirect_delay_ms
                    .unwrap_or(DEFAULT_REDIRECT_DELAY_MS),
            ),
            processing_label: cfg
                .forms
                .processing_label
                .unwrap_or_else(|| DEFAULT_PROCESSING_LABEL.to_string()),
        };

        let inactivity = InactivityConfig {
            timeout: Duration::from_secs(
                cfg.inactivity
                    .timeout_secs
                    .unwrap_or(DEFAULT_INACTIVITY_SECS),
            ),
            activity_throttle: Duration::from_millis(
                cfg.inactivity
                    .activity_throttle_ms
                    .unwrap_or(DEFAULT_ACTIVITY_THROTTLE_MS),
            ),
            logout_path: cfg
                .inactivity
                .logout_path
                .unwrap_or_else(|| DEFAULT_LOGOUT_PATH.to_string()),
        };

        let http_timeout = match cfg.http.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            base_url,
            edu_home,
            search,
            notifications,
            forms,
            inactivity,
            http_timeout,
        })
    }

    /// Defaults only, rooted at `edu_home`. Used by tests and embedders that
    /// do not read a config file.
    pub fn for_home(edu_home: PathBuf) -> Result<Self> {
        Self::load_from_base_config_with_overrides(
            ConfigToml::default(),
            ConfigOverrides::default(),
            edu_home,
        )
    }
}

/// Returns the path to the home directory, `$EDU_HOME` if set, otherwise
/// `~/.eduplatform`. The directory is not required to exist.
pub fn find_edu_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("EDU_HOME") {
        if !val.is_empty() {
            return Ok(PathBuf::from(val));
        }
    }
    let mut p = dirs::home_dir().ok_or(UiErr::NoHomeDir)?;
    p.push(".eduplatform");
    Ok(p)
}

/// Read `config.toml` as a generic TOML value. A missing file is an empty table.
pub fn load_config_as_toml(edu_home: &Path) -> Result<toml::Value> {
    let config_toml_path = edu_home.join(CONFIG_TOML_FILE);
    match std::fs::read_to_string(&config_toml_path) {
        Ok(contents) => Ok(toml::from_str::<toml::Value>(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found, using defaults", config_toml_path.display());
            Ok(toml::Value::Table(Default::default()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse a `-c key=value` flag. The value is read as TOML when possible and
/// as a bare string otherwise, so `-c base_url=http://x` needs no quoting.
pub fn parse_cli_override(raw: &str) -> Result<(String, toml::Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| UiErr::InvalidOverride(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(UiErr::InvalidOverride(raw.to_string()));
    }
    let value = value.trim();
    let parsed = toml::from_str::<toml::Table>(&format!("v = {value}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

/// Set the value at a dotted `path` inside `root`, creating tables as needed.
fn apply_toml_override(root: &mut toml::Value, path: &str, value: toml::Value) -> Result<()> {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let toml::Value::Table(table) = current else {
            return Err(UiErr::UnknownConfigKey(path.to_string()));
        };
        if segments.peek().is_none() {
            table.insert(segment.to_string(), value);
            return Ok(());
        }
        current = table
            .entry(segment.to_string())
            .or_insert(toml::Value::Table(Default::default()));
    }
    Err(UiErr::InvalidOverride(path.to_string()))
}
