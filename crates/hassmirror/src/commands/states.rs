//! `states` and `state`: raw remote records, fetched once.

use tabled::Tabled;

use hassmirror_core::{ConnectionConfig, CoreError, EntityState};

use crate::cli::{GlobalOpts, StateArgs, StatesArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Device Class")]
    device_class: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&EntityState> for StateRow {
    fn from(e: &EntityState) -> Self {
        Self {
            entity_id: e.entity_id.clone(),
            state: e.state.clone().unwrap_or_default(),
            unit: e.unit_of_measurement().unwrap_or_default(),
            device_class: e.device_class().unwrap_or_default(),
            updated: e
                .extra
                .get("last_updated")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

fn detail(e: &EntityState) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let _ = writeln!(out, "Entity:  {}", e.entity_id);
    let _ = writeln!(out, "State:   {}", e.state.as_deref().unwrap_or("-"));
    if let Some(ref attrs) = e.attributes {
        let _ = writeln!(out, "Attributes:");
        for (key, value) in attrs {
            let rendered = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_owned);
            let _ = writeln!(out, "  {key}: {rendered}");
        }
    }
    out.trim_end().to_owned()
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_list(
    conn: &ConnectionConfig,
    args: StatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = conn.build_client()?;
    let pb = util::spinner("Fetching states", global.quiet);
    let result = client.get_all_states().await;
    pb.finish_and_clear();

    let mut states = result.map_err(CoreError::from)?;
    if let Some(ref domain) = args.domain {
        states.retain(|e| e.domain() == domain.as_str());
    }

    let out = output::render_list(&global.output, &states, |e| StateRow::from(e), |e| {
        e.entity_id.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_one(
    conn: &ConnectionConfig,
    args: StateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = conn.build_client()?;
    let pb = util::spinner("Fetching state", global.quiet);
    let result = client.get_state(&args.entity_id).await;
    pb.finish_and_clear();

    let state = match result {
        Ok(state) => state,
        Err(e) if e.is_not_found() => {
            return Err(CliError::NotFound {
                resource_type: "entity".into(),
                identifier: args.entity_id,
                list_command: "states".into(),
            });
        }
        Err(e) => return Err(CoreError::from(e).into()),
    };

    let out = output::render_single(&global.output, &state, detail, |e| {
        e.state.clone().unwrap_or_default()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
