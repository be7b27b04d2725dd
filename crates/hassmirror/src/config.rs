//! CLI configuration: thin wrapper around `hassmirror_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --token, --ssl, --timeout, --insecure).

use secrecy::SecretString;

use hassmirror_core::ConnectionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use hassmirror_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve the token with the CLI flag first, then the shared chain.
fn resolve_token_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        return Ok(SecretString::from(token.clone()));
    }
    Ok(hassmirror_config::resolve_token(profile, profile_name)?)
}

/// Translate a `Profile` + global flags into a `ConnectionConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ConnectionConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ssl) = global.ssl {
        profile.ssl = ssl;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let token = resolve_token_with_flag(&profile, profile_name, global)?;
    Ok(hassmirror_config::profile_to_connection_config(
        &profile,
        profile_name,
        defaults,
        token,
    )?)
}

/// Build a `ConnectionConfig` from the config file, profile, and CLI
/// overrides. Returns the profile name alongside.
pub fn build_connection_config(
    global: &GlobalOpts,
) -> Result<(String, ConnectionConfig), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let conn = resolve_profile(profile, &profile_name, &cfg.defaults, global)?;
        return Ok((profile_name, conn));
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile -- build from CLI flags / env vars alone.
    let url = global.url.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let token = global.token.clone().ok_or_else(|| CliError::NoCredentials {
        profile: profile_name.clone(),
    })?;

    let profile = Profile {
        url,
        ssl: global.ssl.unwrap_or(true),
        insecure: global.insecure.then_some(true),
        timeout: global.timeout,
        ..Profile::default()
    };
    let conn = hassmirror_config::profile_to_connection_config(
        &profile,
        &profile_name,
        &cfg.defaults,
        SecretString::from(token),
    )?;
    Ok((profile_name, conn))
}

/// Comma-separated profile names, or "(none)".
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
