//! `watch`: keep the coordinator polling and print sensor changes.
//!
//! Runs until Ctrl-C. A rejected token ends the watch with an auth error;
//! other failed polls are reported and the previous readings stay.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use hassmirror_core::{ConnectionConfig, FailureKind, Mirror, SensorReading, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::sensors::SensorView;
use super::util;

/// One changed reading, as printed in JSON output modes.
#[derive(Debug, Serialize)]
struct ChangeEvent<'a> {
    at: DateTime<Utc>,
    entity_id: &'a str,
    name: &'a str,
    #[serde(flatten)]
    reading: &'a SensorReading,
}

fn print_change(global: &GlobalOpts, color: bool, view: &SensorView, at: DateTime<Utc>) {
    let line = format_change(&global.output, color, view, at);
    output::print_output(&line, global.quiet);
}

/// Render one change. YAML output gets one `---` document per change.
fn format_change(
    format: &OutputFormat,
    color: bool,
    view: &SensorView,
    at: DateTime<Utc>,
) -> String {
    let event = ChangeEvent {
        at,
        entity_id: &view.entity_id,
        name: &view.name,
        reading: &view.reading,
    };
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            serde_json::to_string(&event).unwrap_or_default()
        }
        OutputFormat::Yaml => {
            let doc = serde_yaml::to_string(&event).unwrap_or_default();
            format!("---\n{}", doc.trim_end())
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let time = at.with_timezone(&Local).format("%H:%M:%S").to_string();
            let time = if color { time.dimmed().to_string() } else { time };
            let value = output::value_cell(view.reading.value.as_deref(), color);
            let unit = view.reading.unit_of_measurement.as_deref().unwrap_or_default();
            format!("{time}  {} ({})  {value} {unit}", view.name, view.entity_id)
                .trim_end()
                .to_owned()
        }
    }
}

/// Print every sensor whose reading differs from `last`, then record it.
fn emit_changes(
    mirror: &Mirror,
    snapshot: &Snapshot,
    last: &mut HashMap<String, SensorReading>,
    global: &GlobalOpts,
    color: bool,
) {
    let at = snapshot.fetched_at().unwrap_or_else(Utc::now);
    for sensor in mirror.sensors() {
        let reading = sensor.read(snapshot);
        if last.get(sensor.remote_id()) == Some(&reading) {
            continue;
        }
        let view = SensorView {
            entity_id: sensor.remote_id().to_owned(),
            unique_id: sensor.unique_id().to_owned(),
            name: sensor.name().to_owned(),
            enabled_by_default: sensor.enabled_by_default(),
            reading: reading.clone(),
        };
        print_change(global, color, &view, at);
        last.insert(sensor.remote_id().to_owned(), reading);
    }
}

pub async fn handle(
    mut conn: ConnectionConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref interval) = args.interval {
        conn.poll_interval = hassmirror_config::parse_duration("interval", interval)?;
    }
    let url = util::display_url(&conn);

    let pb = util::spinner("Connecting", global.quiet);
    let result = Mirror::setup(conn).await;
    pb.finish_and_clear();
    let mirror = result?;

    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!(
            "{} watching {} sensors on {url} every {} (Ctrl-C to stop)",
            output::status_mark(true, color),
            mirror.sensors().len(),
            humantime::format_duration(mirror.config().poll_interval),
        );
    }

    let coordinator = mirror.coordinator().clone();
    let mut snapshots = coordinator.snapshots();
    let mut failures = coordinator.failures();
    let mut last = HashMap::new();
    emit_changes(&mirror, snapshots.current(), &mut last, global, color);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            snapshot = snapshots.changed() => {
                let Some(snapshot) = snapshot else { break Ok(()) };
                debug!(entities = snapshot.len(), "snapshot replaced");
                emit_changes(&mirror, &snapshot, &mut last, global, color);
            }
            failure = failures.recv() => match failure {
                Ok(f) if f.kind == FailureKind::AuthFailed => {
                    break Err(CliError::AuthFailed { profile: mirror.config().id.clone() });
                }
                Ok(f) => {
                    eprintln!(
                        "{} update failed: {} (keeping previous readings)",
                        output::status_mark(false, color),
                        f.message
                    );
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    mirror.unload().await;
    outcome
}
