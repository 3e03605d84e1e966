//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use flarestat_config::{self as cfgfile, Config, Profile};
use flarestat_core::{BandwidthUnit, QueryKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Placeholder written in place of plaintext tokens by `config show`.
const REDACTED: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn save(cfg: &Config) -> Result<(), CliError> {
    let path = cfgfile::save_config(cfg)?;
    tracing::debug!(path = %path.display(), "config written");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => show(global),
        ConfigCommand::SetToken { token } => set_token(token, global),
        ConfigCommand::Set { key, value } => set(&key, value, global),
        ConfigCommand::Profiles => {
            let cfg = cfgfile::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: flarestat config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }
        ConfigCommand::Use { name } => {
            let mut cfg = cfgfile::load_config()?;
            config::require_profile(&cfg, &name)?;
            cfg.default_profile = Some(name.clone());
            save(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", cfgfile::config_path().display());
            Ok(())
        }
    }
}

// ── Init: interactive wizard ─────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let path = cfgfile::config_path();
    eprintln!("flarestat configuration");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = cfgfile::load_config()?;

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let zone_id: String = Input::new()
        .with_prompt("Zone ID")
        .interact_text()
        .map_err(prompt_err)?;

    let token = Password::new()
        .with_prompt("API token (Zone > Analytics > Read)")
        .interact()
        .map_err(prompt_err)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "api_token".into(),
            reason: "API token cannot be empty".into(),
        });
    }

    let store_choices = &["Store in system keyring (recommended)", "Save to config file (plaintext)"];
    let store_selection = Select::new()
        .with_prompt("Where to store the API token?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let api_token = if store_selection == 0 {
        cfgfile::store_api_token(&profile_name, &SecretString::from(token))?;
        eprintln!("   ✓ API token stored in system keyring");
        None
    } else {
        Some(token)
    };

    let units: Vec<String> = BandwidthUnit::all().iter().map(ToString::to_string).collect();
    let default_unit = units
        .iter()
        .position(|u| *u == BandwidthUnit::default().to_string())
        .unwrap_or(0);
    let unit = Select::new()
        .with_prompt("Bandwidth unit")
        .items(&units)
        .default(default_unit)
        .interact()
        .map_err(prompt_err)?;

    let queries = [QueryKind::Rolling, QueryKind::Dashboard];
    let query_labels = &[
        "rolling: today / 7 days / 30 days, countries, page load",
        "dashboard: today's cache, SSL, threats, status codes, top-N",
    ];
    let query = Select::new()
        .with_prompt("Query")
        .items(query_labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let profile = Profile {
        zone_id,
        api_token,
        bandwidth_unit: units.get(unit).cloned(),
        query: queries.get(query).map(ToString::to_string),
        ..Profile::default()
    };
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    save(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: flarestat metrics");
    Ok(())
}

// ── Show ─────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = redacted(cfgfile::load_config()?);
    let out = output::render_single(
        &global.output,
        &cfg,
        toml_or_debug,
        |c| c.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.api_token.is_some() {
            profile.api_token = Some(REDACTED.into());
        }
    }
    cfg
}

fn toml_or_debug(cfg: &Config) -> String {
    cfgfile::to_toml(cfg).unwrap_or_else(|_| format!("{cfg:#?}"))
}

// ── SetToken ─────────────────────────────────────────────────────────

fn set_token(token: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = cfgfile::load_config()?;
    let profile_name = cfg.active_profile_name(global.profile.as_deref());
    config::require_profile(&cfg, &profile_name)?;

    let token = match token {
        Some(token) => token,
        None => Password::new()
            .with_prompt("API token")
            .interact()
            .map_err(prompt_err)?,
    };
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_token".into(),
            reason: "value cannot be empty".into(),
        });
    }

    cfgfile::store_api_token(&profile_name, &SecretString::from(token.trim().to_owned()))?;
    eprintln!("✓ API token stored in system keyring for profile '{profile_name}'");
    Ok(())
}

// ── Set <key> <value> ────────────────────────────────────────────────

fn set(key: &str, value: String, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = cfgfile::load_config()?;
    let profile_name = cfg.active_profile_name(global.profile.as_deref());
    let profile = cfg.profiles.entry(profile_name.clone()).or_default();

    apply_field(profile, key, value)?;

    save(&cfg)?;
    eprintln!("✓ Set {key} on profile '{profile_name}'");
    Ok(())
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

fn apply_field(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "zone_id" | "zone-id" | "zone" => profile.zone_id = value,
        "api_token_env" | "api-token-env" => profile.api_token_env = Some(value),
        "endpoint" => profile.endpoint = Some(value),
        "query" => {
            value.parse::<QueryKind>().map_err(|_| CliError::Validation {
                field: "query".into(),
                reason: "must be 'rolling' or 'dashboard'".into(),
            })?;
            profile.query = Some(value.to_lowercase());
        }
        "bandwidth_unit" | "bandwidth-unit" | "unit" => {
            profile.bandwidth_unit = Some(BandwidthUnit::from_setting(&value).to_string());
        }
        "refresh_interval" | "refresh-interval" => {
            profile.refresh_interval = Some(parse_secs("refresh_interval", &value)?);
        }
        "min_refresh_interval" | "min-refresh-interval" => {
            profile.min_refresh_interval = Some(parse_secs("min_refresh_interval", &value)?);
        }
        "timeout" => profile.timeout = Some(parse_secs("timeout", &value)?),
        "top_limit" | "top-limit" => {
            profile.top_limit = Some(value.parse().map_err(|_| CliError::Validation {
                field: "top_limit".into(),
                reason: "must be a positive integer".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: zone_id, api_token_env, \
                     endpoint, query, bandwidth_unit, refresh_interval, min_refresh_interval, \
                     timeout, top_limit"
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_normalizes_units_and_validates_query() {
        let mut profile = Profile::default();
        apply_field(&mut profile, "unit", "gb".into()).unwrap();
        assert_eq!(profile.bandwidth_unit.as_deref(), Some("GB"));

        apply_field(&mut profile, "query", "Dashboard".into()).unwrap();
        assert_eq!(profile.query.as_deref(), Some("dashboard"));

        let err = apply_field(&mut profile, "query", "weekly".into()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
        let err = apply_field(&mut profile, "colour", "red".into()).unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn show_redacts_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "blog".into(),
            Profile {
                zone_id: "z".into(),
                api_token: Some("secret-value".into()),
                ..Profile::default()
            },
        );
        let text = toml_or_debug(&redacted(cfg));
        assert!(!text.contains("secret-value"));
        assert!(text.contains(REDACTED));
    }
}
