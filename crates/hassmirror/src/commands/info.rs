//! `info`: device record plus a summary of the connection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hassmirror_core::{ConnectionConfig, DeviceInfo, Mirror};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct InfoView {
    profile: String,
    url: String,
    poll_interval: String,
    timeout_secs: u64,
    entities: usize,
    sensors: usize,
    fetched_at: Option<DateTime<Utc>>,
    device: DeviceInfo,
}

fn detail(v: &InfoView) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let _ = writeln!(out, "Device:        {}", v.device.name);
    let _ = writeln!(out, "Manufacturer:  {}", v.device.manufacturer);
    let _ = writeln!(out, "Model:         {}", v.device.model);
    for (domain, id) in &v.device.identifiers {
        let _ = writeln!(out, "Identifier:    {domain}/{id}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Profile:       {}", v.profile);
    let _ = writeln!(out, "URL:           {}", v.url);
    let _ = writeln!(out, "Poll interval: {}", v.poll_interval);
    let _ = writeln!(out, "Timeout:       {}s", v.timeout_secs);
    let _ = writeln!(out, "Entities:      {}", v.entities);
    let _ = writeln!(out, "Sensors:       {}", v.sensors);
    if let Some(at) = v.fetched_at {
        let _ = writeln!(out, "Fetched at:    {}", at.to_rfc3339());
    }
    out.trim_end().to_owned()
}

pub async fn handle(
    conn: ConnectionConfig,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let url = util::display_url(&conn);
    let pb = util::spinner("Connecting", global.quiet);
    let result = Mirror::setup(conn).await;
    pb.finish_and_clear();
    let mirror = result?;

    let snapshot = mirror.coordinator().current_snapshot();
    let view = InfoView {
        profile: profile_name.to_owned(),
        url,
        poll_interval: humantime::format_duration(mirror.config().poll_interval).to_string(),
        timeout_secs: mirror.config().timeout.as_secs(),
        entities: snapshot.len(),
        sensors: mirror.sensors().len(),
        fetched_at: snapshot.fetched_at(),
        device: mirror.device_info().clone(),
    };
    mirror.unload().await;

    let out = output::render_single(&global.output, &view, detail, |v| v.device.name.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
