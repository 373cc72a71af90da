use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::projection::ScenePosition;
use super::trail::TrailBuffer;
use super::types::{AircraftId, TelemetryRecord};
use crate::scene::RenderHandle;

/// Freshness of an entity. Evicted entities are deleted from the table, so
/// there is no variant for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Liveness {
    Alive,
    Removed,
}

#[derive(Debug)]
pub struct AircraftEntity {
    pub id: AircraftId,
    pub telemetry: TelemetryRecord,
    pub scene_position: Option<ScenePosition>,
    pub heading_rad: f64,
    pub last_seen: DateTime<Utc>,
    pub liveness: Liveness,
    pub trail: TrailBuffer,
    pub aircraft_handle: RenderHandle,
    pub trail_handle: RenderHandle,
}

impl AircraftEntity {
    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }

    pub fn label(&self) -> String {
        label_for(&self.id, &self.telemetry)
    }

    pub fn idle_millis(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_seen).num_milliseconds()
    }

    pub fn idle_minutes(&self, now: DateTime<Utc>) -> f64 {
        self.idle_millis(now) as f64 / 60_000.0
    }
}

pub fn label_for(id: &AircraftId, telemetry: &TelemetryRecord) -> String {
    non_blank(&telemetry.callsign)
        .or_else(|| non_blank(&telemetry.icao))
        .map(String::from)
        .unwrap_or_else(|| id.to_string())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_fallbacks() {
        let id = AircraftId::new("4242");
        let mut telemetry = TelemetryRecord {
            callsign: Some("VOI1234".into()),
            icao: Some("0D0ABC".into()),
            ..Default::default()
        };
        assert_eq!(label_for(&id, &telemetry), "VOI1234");

        telemetry.callsign = Some("   ".into());
        assert_eq!(label_for(&id, &telemetry), "0D0ABC");

        telemetry.icao = None;
        assert_eq!(label_for(&id, &telemetry), "4242");
    }

    #[test]
    fn test_liveness_display() {
        assert_eq!(Liveness::Alive.to_string(), "alive");
        assert_eq!(Liveness::Removed.to_string(), "removed");
    }
}
