//! `setup`: collect connection details, validate them against the hub,
//! and save a profile. Nothing is written unless validation succeeds.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input, Select};
use secrecy::{ExposeSecret, SecretString};

use hassmirror_core::{SetupErrorKind, validate_credentials};

use crate::cli::{GlobalOpts, SetupArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

/// Where the validated token ends up.
enum TokenStorage {
    Keyring,
    Plaintext,
}

fn prompt_storage() -> Result<TokenStorage, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the access token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(if selection == 0 {
        TokenStorage::Keyring
    } else {
        TokenStorage::Plaintext
    })
}

fn missing(field: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: "required in non-interactive mode".into(),
    }
}

#[allow(clippy::too_many_lines)]
pub async fn handle(args: SetupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let interactive = !args.non_interactive && std::io::stdin().is_terminal();
    let mut cfg = config::load_config_or_default();

    if interactive && !global.quiet {
        eprintln!("hassmirror: add a remote hub");
        eprintln!("   Config path: {}\n", config::config_path().display());
    }

    // 1. Profile name
    let profile_name = match args.name.or_else(|| global.profile.clone()) {
        Some(name) => name,
        None if interactive => Input::new()
            .with_prompt("Profile name")
            .default("default".to_owned())
            .interact_text()
            .map_err(prompt_err)?,
        None => "default".to_owned(),
    };

    // 2. Host
    let url = match global.url.clone() {
        Some(url) => url,
        None if interactive => Input::new()
            .with_prompt("Hub host (without scheme)")
            .default("homeassistant.local:8123".to_owned())
            .interact_text()
            .map_err(prompt_err)?,
        None => return Err(missing("url")),
    };

    // 3. TLS
    let ssl = match global.ssl {
        Some(ssl) => ssl,
        None if interactive => Confirm::new()
            .with_prompt("Use https?")
            .default(true)
            .interact()
            .map_err(prompt_err)?,
        None => true,
    };

    // 4. Token
    let token = match global.token.clone() {
        Some(token) => token,
        None if interactive => {
            rpassword::prompt_password("Long-lived access token: ").map_err(prompt_err)?
        }
        None => return Err(missing("token")),
    };
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "access token cannot be empty".into(),
        });
    }
    let token = SecretString::from(token.trim().to_owned());

    // 5. Display title (defaults to the host)
    let title = match args.title {
        Some(title) => title,
        None if interactive => Input::new()
            .with_prompt("Display name")
            .default(url.clone())
            .interact_text()
            .map_err(prompt_err)?,
        None => url.clone(),
    };

    let mut profile = Profile {
        url,
        ssl,
        name: Some(title),
        insecure: global.insecure.then_some(true),
        timeout: global.timeout,
        ..Profile::default()
    };

    // 6. Validate with one full fetch
    let conn = hassmirror_config::profile_to_connection_config(
        &profile,
        &profile_name,
        &cfg.defaults,
        token.clone(),
    )?;
    let pb = util::spinner("Validating credentials", global.quiet);
    let result = validate_credentials(&conn).await;
    pb.finish_and_clear();
    let entities = result.map_err(|e| CliError::Setup {
        kind: SetupErrorKind::from(&e),
        detail: e.to_string(),
    })?;

    // 7. Store the token
    let storage = if args.plaintext {
        TokenStorage::Plaintext
    } else if interactive {
        prompt_storage()?
    } else {
        TokenStorage::Keyring
    };
    match storage {
        TokenStorage::Keyring => hassmirror_config::store_token(&profile_name, &token)?,
        TokenStorage::Plaintext => profile.token = Some(token.expose_secret().to_owned()),
    }

    // 8. Save
    if cfg.profiles.insert(profile_name.clone(), profile).is_some() {
        tracing::info!(profile = %profile_name, "replaced existing profile");
    }
    let default_exists = cfg
        .default_profile
        .as_ref()
        .is_some_and(|name| cfg.profiles.contains_key(name));
    if !default_exists {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save_config(&cfg)?;

    if !global.quiet {
        let color = output::should_color(&global.color);
        eprintln!(
            "{} Profile '{profile_name}' saved ({entities} entities visible)",
            output::status_mark(true, color)
        );
        eprintln!("  Config: {}", config::config_path().display());
        eprintln!("  Try it: hassmirror --profile {profile_name} sensors");
    }
    Ok(())
}
