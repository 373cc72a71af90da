use serde::Deserialize;
use std::time::Duration;

use super::entity::AircraftEntity;
use super::projection::{ScenePosition, FEET_TO_KM};
use super::table::TrackingTable;
use super::types::TelemetryRecord;
use crate::scene::SceneSink;
use crate::utils::deserialize_duration;

pub const KNOTS_TO_KM_H: f64 = 1.852;

/// Empirical factor that matches dead-reckoned motion to the observed
/// spacing of position fixes. Needs calibration against recorded feeds.
pub const DEFAULT_SPEED_CORRECTION: f64 = 0.5418;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub speed_correction: f64,
    #[serde(deserialize_with = "deserialize_duration")]
    pub frame_interval: Duration,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_correction: DEFAULT_SPEED_CORRECTION,
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    speed_correction: f64,
    height_scaling: f64,
}

impl MotionIntegrator {
    pub fn new(config: &MotionConfig, height_scaling: f64) -> Self {
        Self {
            speed_correction: config.speed_correction,
            height_scaling,
        }
    }

    pub fn horizontal_rate(&self, speed_kts: f64) -> f64 {
        speed_kts * KNOTS_TO_KM_H / 3600.0 * self.speed_correction
    }

    pub fn vertical_rate(&self, vertical_speed_fpm: f64) -> f64 {
        vertical_speed_fpm / 60.0 * FEET_TO_KM * self.height_scaling
    }

    /// Missing speed, climb rate or track count as zero.
    pub fn displacement(&self, telemetry: &TelemetryRecord, elapsed_ms: f64) -> ScenePosition {
        let seconds = elapsed_ms / 1000.0;
        let distance = self.horizontal_rate(telemetry.speed_kts.unwrap_or(0.0)) * seconds;
        let heading = (telemetry.track_deg.unwrap_or(0.0) - 90.0).to_radians();

        ScenePosition::new(
            distance * heading.cos(),
            self.vertical_rate(telemetry.vertical_speed_fpm.unwrap_or(0.0)) * seconds,
            distance * heading.sin(),
        )
    }

    pub fn advance(&self, entity: &mut AircraftEntity, elapsed_ms: f64) -> Option<ScenePosition> {
        if !entity.is_alive() {
            return None;
        }
        let current = entity.scene_position?;
        let next = current.offset(self.displacement(&entity.telemetry, elapsed_ms));
        entity.scene_position = Some(next);
        Some(next)
    }

    pub fn advance_all<S: SceneSink>(&self, table: &mut TrackingTable, elapsed_ms: f64, scene: &mut S) -> usize {
        let mut moved = 0;
        for entity in table.iter_mut() {
            if let Some(position) = self.advance(entity, elapsed_ms) {
                scene.set_position(entity.aircraft_handle, position);
                moved += 1;
            }
        }
        moved
    }
}
