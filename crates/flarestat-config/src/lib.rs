//! Profile configuration for flarestat.
//!
//! TOML profiles, API token resolution (env + keyring + plaintext), and
//! translation to `flarestat_core::ZoneConfig`. The CLI layers flag
//! overrides on top of what is resolved here.

use std::collections::BTreeMap;
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

use flarestat_core::config::{DEFAULT_MIN_REFRESH_INTERVAL, DEFAULT_TOP_LIMIT};
use flarestat_core::{BandwidthUnit, QueryKind, ZoneConfig};

/// Keyring service name; accounts are `<profile>/api-token`.
pub const KEYRING_SERVICE: &str = "flarestat";

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "FLARESTAT_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named zone profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The active profile name: explicit choice, else `default_profile`,
    /// else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

/// Values a profile inherits when it does not set its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between scheduled refreshes in `watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// One of B, KB, MB, GB (case-insensitive).
    #[serde(default = "default_bandwidth_unit")]
    pub bandwidth_unit: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
            bandwidth_unit: default_bandwidth_unit(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    20
}
fn default_refresh_interval() -> u64 {
    300
}
fn default_bandwidth_unit() -> String {
    BandwidthUnit::default().to_string()
}

/// A named zone profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Cloudflare zone identifier (32 hex chars in practice; opaque here).
    pub zone_id: String,

    /// API token (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Environment variable holding the API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,

    /// GraphQL endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// "rolling" or "dashboard".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,

    /// Throttle floor inside the fetcher, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_refresh_interval: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth_unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Rows per top-N list (dashboard query).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_limit: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$FLARESTAT_CONFIG`, else the platform
/// config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "flarestat", "flarestat").map_or_else(
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
    p.push("flarestat");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// `FLARESTAT_DEFAULT_PROFILE` and `FLARESTAT_DEFAULTS__<FIELD>` override
/// the file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLARESTAT_").split("__").ignore(&["config"]));

    Ok(figment.extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml(cfg)?)?;
    Ok(())
}

/// Render the config as it would be written to disk.
pub fn to_toml(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-token"))
}

/// Resolve the API token: profile's `api_token_env`, then the system
/// keyring, then plaintext in the config.
pub fn resolve_api_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = profile.api_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_api_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `ZoneConfig` from a profile plus inherited defaults. The
/// token is resolved separately so callers can layer a flag on top.
pub fn profile_to_zone_config(
    profile: &Profile,
    defaults: &Defaults,
    api_token: SecretString,
) -> Result<ZoneConfig, ConfigError> {
    if profile.zone_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "zone_id".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut config = ZoneConfig::new(profile.zone_id.trim(), api_token);

    if let Some(ref raw) = profile.endpoint {
        let url = raw.parse().map_err(|e| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })?;
        config.endpoint = Some(url);
    }

    if let Some(ref raw) = profile.query {
        config.query = raw.parse::<QueryKind>().map_err(|_| ConfigError::Validation {
            field: "query".into(),
            reason: format!("expected 'rolling' or 'dashboard', got '{raw}'"),
        })?;
    }

    config.refresh_interval =
        Duration::from_secs(profile.refresh_interval.unwrap_or(defaults.refresh_interval));
    config.min_refresh_interval = profile
        .min_refresh_interval
        .map_or(DEFAULT_MIN_REFRESH_INTERVAL, Duration::from_secs);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.bandwidth_unit = BandwidthUnit::from_setting(
        profile
            .bandwidth_unit
            .as_deref()
            .unwrap_or(&defaults.bandwidth_unit),
    );
    config.top_limit = profile.top_limit.unwrap_or(DEFAULT_TOP_LIMIT);

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn token() -> SecretString {
        SecretString::from("tok".to_string())
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 20);
        assert_eq!(cfg.defaults.bandwidth_unit, "MB");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn saved_profile_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "blog".into(),
            Profile {
                zone_id: "abc123".into(),
                bandwidth_unit: Some("gb".into()),
                query: Some("dashboard".into()),
                ..Profile::default()
            },
        );
        save_config_to(&path, &cfg).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("api_token"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, cfg.profiles);
    }

    #[test]
    fn profile_overrides_defaults() {
        let profile = Profile {
            zone_id: " zone-9 ".into(),
            bandwidth_unit: Some("kb".into()),
            refresh_interval: Some(600),
            min_refresh_interval: Some(5),
            top_limit: Some(3),
            ..Profile::default()
        };
        let zone = profile_to_zone_config(&profile, &Defaults::default(), token()).unwrap();
        assert_eq!(zone.zone_id, "zone-9");
        assert_eq!(zone.bandwidth_unit, BandwidthUnit::Kilobytes);
        assert_eq!(zone.refresh_interval, Duration::from_secs(600));
        assert_eq!(zone.min_refresh_interval, Duration::from_secs(5));
        assert_eq!(zone.timeout, Duration::from_secs(20));
        assert_eq!(zone.top_limit, 3);
        assert_eq!(zone.query, QueryKind::Rolling);
    }

    #[test]
    fn unknown_unit_falls_back_but_unknown_query_is_rejected() {
        let profile = Profile {
            zone_id: "z".into(),
            bandwidth_unit: Some("TB".into()),
            ..Profile::default()
        };
        let zone = profile_to_zone_config(&profile, &Defaults::default(), token()).unwrap();
        assert_eq!(zone.bandwidth_unit, BandwidthUnit::Megabytes);

        let profile = Profile {
            query: Some("hourly".into()),
            ..profile
        };
        let err = profile_to_zone_config(&profile, &Defaults::default(), token()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "query"));
    }

    #[test]
    fn empty_zone_and_bad_endpoint_are_rejected() {
        let err = profile_to_zone_config(&Profile::default(), &Defaults::default(), token()).unwrap_err();
        assert!(err.to_string().contains("zone_id"));

        let profile = Profile {
            zone_id: "z".into(),
            endpoint: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_zone_config(&profile, &Defaults::default(), token()).unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn active_profile_prefers_explicit_choice() {
        let cfg = Config {
            default_profile: Some("blog".into()),
            ..Config::default()
        };
        assert_eq!(cfg.active_profile_name(Some("shop")), "shop");
        assert_eq!(cfg.active_profile_name(None), "blog");
        assert!(matches!(cfg.profile("blog"), Err(ConfigError::UnknownProfile { .. })));
    }
}
