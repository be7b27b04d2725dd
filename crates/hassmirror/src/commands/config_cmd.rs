//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    for profile in shown.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    shown
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

#[derive(Debug, Serialize)]
struct ProfileSummary {
    name: String,
    url: String,
    ssl: bool,
    default: bool,
    token_source: &'static str,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "SSL")]
    ssl: bool,
    #[tabled(rename = "Token")]
    token_source: &'static str,
}

fn summarize(cfg: &Config) -> Vec<ProfileSummary> {
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            url: p.url.clone(),
            ssl: p.ssl,
            default: cfg.default_profile.as_deref() == Some(name.as_str()),
            token_source: if p.token_env.is_some() {
                "env"
            } else if p.token.is_some() {
                "plaintext"
            } else {
                "keyring"
            },
        })
        .collect()
}

fn require_profile(cfg: &Config, name: &str) -> Result<(), CliError> {
    if cfg.profiles.contains_key(name) {
        Ok(())
    } else {
        Err(CliError::ProfileNotFound {
            name: name.into(),
            available: config::available_profiles(cfg),
        })
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let profiles = summarize(&cfg);
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| ProfileRow {
                    marker: if p.default { "*" } else { "" },
                    name: p.name.clone(),
                    url: p.url.clone(),
                    ssl: p.ssl,
                    token_source: p.token_source,
                },
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            require_profile(&cfg, &name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            require_profile(&cfg, &name)?;

            let token = match global.token.clone() {
                Some(token) => token,
                None => {
                    rpassword::prompt_password("Long-lived access token: ").map_err(prompt_err)?
                }
            };
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "access token cannot be empty".into(),
                });
            }
            hassmirror_config::store_token(
                &name,
                &secrecy::SecretString::from(token.trim().to_owned()),
            )?;
            if !global.quiet {
                eprintln!("Token for '{name}' stored in system keyring");
            }
            Ok(())
        }

        ConfigCommand::Remove { name } => {
            let mut cfg = config::load_config_or_default();
            require_profile(&cfg, &name)?;
            cfg.profiles.remove(&name);
            if cfg.default_profile.as_deref() == Some(name.as_str()) {
                cfg.default_profile = cfg.profiles.keys().next().cloned();
            }
            config::save_config(&cfg)?;
            if let Err(e) = hassmirror_config::delete_token(&name) {
                tracing::debug!(error = %e, "no keyring entry removed");
            }
            if !global.quiet {
                eprintln!("Profile '{name}' removed");
            }
            Ok(())
        }
    }
}
