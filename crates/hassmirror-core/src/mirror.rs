// ── Mirror ──
//
// One configured connection, fully wired: coordinator started, device
// record built, and one adapter per qualifying sensor. Dropping or
// unloading a mirror has no effect on any other mirror.

use std::sync::Arc;

use tracing::info;

use crate::config::ConnectionConfig;
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::DeviceInfo;
use crate::sensor::{SensorAdapter, register_sensors};

#[derive(Debug)]
pub struct Mirror {
    config: ConnectionConfig,
    coordinator: Coordinator,
    device: Arc<DeviceInfo>,
    sensors: Vec<SensorAdapter>,
}

impl Mirror {
    /// Set up a connection: start the coordinator (first refresh must
    /// succeed), then register the sensor adapters it found.
    pub async fn setup(config: ConnectionConfig) -> Result<Self, CoreError> {
        let coordinator = Coordinator::from_config(&config)?;
        coordinator.start().await?;

        let device = Arc::new(DeviceInfo::for_connection(&config));
        let sensors = register_sensors(&coordinator, &config, &device);
        info!(
            connection = %config.id,
            sensors = sensors.len(),
            entities = coordinator.current_snapshot().len(),
            "mirror ready"
        );

        Ok(Self {
            config,
            coordinator,
            device,
            sensors,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn sensors(&self) -> &[SensorAdapter] {
        &self.sensors
    }

    /// Find an adapter by remote entity id.
    pub fn sensor(&self, remote_id: &str) -> Option<&SensorAdapter> {
        self.sensors.iter().find(|s| s.remote_id() == remote_id)
    }

    /// Stop polling and release the connection.
    pub async fn unload(self) {
        self.coordinator.stop().await;
        info!(connection = %self.config.id, "mirror unloaded");
    }
}
