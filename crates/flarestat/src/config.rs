//! Flag-aware configuration resolution.
//!
//! Layers `GlobalOpts` overrides on top of the profile resolved by
//! `flarestat-config`, producing the `ZoneConfig` handed to core.

use std::time::Duration;

use secrecy::SecretString;

use flarestat_config::{Config, ConfigError, Profile};
use flarestat_core::{BandwidthUnit, QueryKind, ZoneConfig};

use crate::cli::{GlobalOpts, QueryArg};
use crate::error::CliError;

/// Everything a network command needs.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub zone: ZoneConfig,
}

impl From<QueryArg> for QueryKind {
    fn from(arg: QueryArg) -> Self {
        match arg {
            QueryArg::Rolling => QueryKind::Rolling,
            QueryArg::Dashboard => QueryKind::Dashboard,
        }
    }
}

/// Load the config file and apply flags.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = flarestat_config::load_config()?;
    resolve_with(&cfg, global)
}

fn resolve_with(cfg: &Config, global: &GlobalOpts) -> Result<Resolved, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let zone = match cfg.profiles.get(&profile_name) {
        Some(profile) => from_profile(cfg, profile, &profile_name, global)?,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => from_flags(cfg, &profile_name, global)?,
    };

    Ok(Resolved { profile_name, zone })
}

fn from_profile(
    cfg: &Config,
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ZoneConfig, CliError> {
    let token = match global.api_token {
        Some(ref token) => SecretString::from(token.clone()),
        None => flarestat_config::resolve_api_token(profile, profile_name)?,
    };

    let mut zone = flarestat_config::profile_to_zone_config(profile, &cfg.defaults, token)?;
    apply_overrides(&mut zone, global);
    Ok(zone)
}

/// No profile on disk: `--zone` and `--api-token` must both be given.
fn from_flags(cfg: &Config, profile_name: &str, global: &GlobalOpts) -> Result<ZoneConfig, CliError> {
    let zone_id = global.zone.as_deref().ok_or_else(|| CliError::NoConfig {
        path: flarestat_config::config_path().display().to_string(),
    })?;
    let token = global
        .api_token
        .as_ref()
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let profile = Profile {
        zone_id: zone_id.into(),
        ..Profile::default()
    };
    let mut zone = flarestat_config::profile_to_zone_config(
        &profile,
        &cfg.defaults,
        SecretString::from(token.clone()),
    )?;
    apply_overrides(&mut zone, global);
    Ok(zone)
}

fn apply_overrides(zone: &mut ZoneConfig, global: &GlobalOpts) {
    if let Some(ref zone_id) = global.zone {
        zone.zone_id.clone_from(zone_id);
    }
    if let Some(ref unit) = global.unit {
        zone.bandwidth_unit = BandwidthUnit::from_setting(unit);
    }
    if let Some(secs) = global.timeout {
        zone.timeout = Duration::from_secs(secs);
    }
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Look up a named profile for `config` subcommands.
pub fn require_profile<'a>(cfg: &'a Config, name: &str) -> Result<&'a Profile, CliError> {
    cfg.profile(name).map_err(|e| match e {
        ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
            name,
            available: available_profiles(cfg),
        },
        other => other.into(),
    })
}
