//! `sensors`: set up the mirror once and list its adapters.

use serde::Serialize;
use tabled::Tabled;

use hassmirror_core::{ConnectionConfig, Mirror, SensorAdapter, SensorReading};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

/// Serializable view of one adapter and its reading.
#[derive(Debug, Serialize)]
pub struct SensorView {
    pub entity_id: String,
    pub unique_id: String,
    pub name: String,
    pub enabled_by_default: bool,
    #[serde(flatten)]
    pub reading: SensorReading,
}

impl From<&SensorAdapter> for SensorView {
    fn from(s: &SensorAdapter) -> Self {
        Self {
            entity_id: s.remote_id().to_owned(),
            unique_id: s.unique_id().to_owned(),
            name: s.name().to_owned(),
            enabled_by_default: s.enabled_by_default(),
            reading: s.reading(),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Device Class")]
    device_class: String,
    #[tabled(rename = "State Class")]
    state_class: String,
}

impl SensorRow {
    fn new(v: &SensorView, color: bool) -> Self {
        Self {
            name: v.name.clone(),
            entity_id: v.entity_id.clone(),
            value: output::value_cell(v.reading.value.as_deref(), color),
            unit: v.reading.unit_of_measurement.clone().unwrap_or_default(),
            device_class: v.reading.device_class.clone().unwrap_or_default(),
            state_class: v.reading.state_class.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(conn: ConnectionConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let pb = util::spinner("Fetching sensors", global.quiet);
    let result = Mirror::setup(conn).await;
    pb.finish_and_clear();
    let mirror = result?;

    let views: Vec<SensorView> = mirror.sensors().iter().map(SensorView::from).collect();
    mirror.unload().await;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &views,
        |v| SensorRow::new(v, color),
        |v| v.entity_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
