use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use utoipa::ToSchema;

use super::entity::{label_for, AircraftEntity, Liveness};
use super::error::TrackingError;
use super::projection::{Projector, ScenePosition};
use super::trail::{TrailBuffer, TrailConfig};
use super::types::{AircraftId, TelemetryRecord};
use crate::scene::SceneSink;
use crate::utils::deserialize_duration;

/// Idle thresholds, both measured against the same `last_seen`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LivenessPolicy {
    #[serde(deserialize_with = "deserialize_duration")]
    pub hide_after: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub evict_after: Duration,
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self {
            hide_after: Duration::from_secs(90),
            evict_after: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Updated,
    Revived,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SweepReport {
    pub demoted: Vec<AircraftId>,
    pub evicted: Vec<AircraftId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct IngestReport {
    pub created: usize,
    pub updated: usize,
    pub revived: usize,
    pub rejected: usize,
    pub tracked: usize,
    pub sweep: SweepReport,
}

pub struct TrackingTable {
    projector: Projector,
    trail_config: TrailConfig,
    policy: LivenessPolicy,
    entries: HashMap<AircraftId, AircraftEntity>,
}

impl TrackingTable {
    pub fn new(projector: Projector, trail_config: TrailConfig, policy: LivenessPolicy) -> Self {
        Self {
            projector,
            trail_config,
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn get(&self, id: &AircraftId) -> Option<&AircraftEntity> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &AircraftId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AircraftEntity> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AircraftEntity> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_alive()).count()
    }

    /// Create-or-update for one record. Records without identity are
    /// rejected before anything is touched.
    pub fn merge_record<S: SceneSink>(
        &mut self,
        record: TelemetryRecord,
        now: DateTime<Utc>,
        scene: &mut S,
    ) -> Result<MergeOutcome, TrackingError> {
        let id = record.aircraft_id().ok_or(TrackingError::MissingIdentity)?;

        let outcome = match self.entries.get_mut(&id) {
            Some(entity) => {
                let previous_label = entity.label();
                entity.telemetry = record;
                entity.last_seen = now;
                let label = entity.label();
                if label != previous_label {
                    scene.set_label(entity.aircraft_handle, &label);
                }
                if entity.liveness == Liveness::Removed {
                    entity.liveness = Liveness::Alive;
                    scene.attach(entity.aircraft_handle);
                    MergeOutcome::Revived
                } else {
                    MergeOutcome::Updated
                }
            }
            None => {
                let aircraft_handle = scene.create_aircraft(&label_for(&id, &record));
                let trail_handle = scene.create_trail(self.trail_config.capacity);
                scene.attach(aircraft_handle);
                scene.attach(trail_handle);

                let entity = AircraftEntity {
                    id: id.clone(),
                    telemetry: record,
                    scene_position: None,
                    heading_rad: 0.0,
                    last_seen: now,
                    liveness: Liveness::Alive,
                    trail: TrailBuffer::new(&self.trail_config),
                    aircraft_handle,
                    trail_handle,
                };
                self.entries.insert(id.clone(), entity);
                MergeOutcome::Created
            }
        };

        if let Some(entity) = self.entries.get_mut(&id) {
            apply_position_fix(&self.projector, entity, scene);
        }

        Ok(outcome)
    }

    pub fn ingest<S, I>(&mut self, batch: I, now: DateTime<Utc>, scene: &mut S) -> IngestReport
    where
        S: SceneSink,
        I: IntoIterator<Item = Result<TelemetryRecord, TrackingError>>,
    {
        let mut report = IngestReport::default();

        for item in batch {
            match item.and_then(|record| self.merge_record(record, now, scene)) {
                Ok(MergeOutcome::Created) => report.created += 1,
                Ok(MergeOutcome::Updated) => report.updated += 1,
                Ok(MergeOutcome::Revived) => report.revived += 1,
                Err(e) => {
                    log::debug!("rejected record: {}", e);
                    report.rejected += 1;
                }
            }
        }

        report.sweep = self.sweep_liveness(now, scene);
        report.tracked = self.entries.len();
        report
    }

    /// Applies the timeout policy to every entity.
    ///
    /// Idle up to `hide_after`: untouched. Up to `evict_after`: `Removed`, the
    /// aircraft is detached but its trail stays. Beyond: evicted, both nodes
    /// are released and the entity is deleted.
    pub fn sweep_liveness<S: SceneSink>(&mut self, now: DateTime<Utc>, scene: &mut S) -> SweepReport {
        let hide_ms = self.policy.hide_after.as_millis() as i64;
        let evict_ms = self.policy.evict_after.as_millis() as i64;
        let mut report = SweepReport::default();

        for entity in self.entries.values_mut() {
            let idle = entity.idle_millis(now);
            if idle <= hide_ms {
                continue;
            }
            if idle <= evict_ms {
                if entity.liveness == Liveness::Alive {
                    log::info!("hiding {} ({})", entity.label(), entity.id);
                    scene.detach(entity.aircraft_handle);
                    entity.liveness = Liveness::Removed;
                    report.demoted.push(entity.id.clone());
                }
            } else {
                report.evicted.push(entity.id.clone());
            }
        }

        for id in &report.evicted {
            if let Some(entity) = self.entries.remove(id) {
                log::info!("erasing {} ({})", entity.label(), entity.id);
                scene.detach(entity.aircraft_handle);
                scene.detach(entity.trail_handle);
                scene.release(entity.aircraft_handle);
                scene.release(entity.trail_handle);
            }
        }

        report
    }
}

fn apply_position_fix<S: SceneSink>(projector: &Projector, entity: &mut AircraftEntity, scene: &mut S) {
    let Some(fix) = entity.telemetry.position_fix() else {
        return;
    };

    let position: ScenePosition = projector.project_fix(&fix);
    entity.scene_position = Some(position);
    if let Some(track) = entity.telemetry.track_deg {
        entity.heading_rad = Projector::yaw(track);
    }
    scene.set_position(entity.aircraft_handle, position);
    scene.set_yaw(entity.aircraft_handle, entity.heading_rad);

    if entity.trail.push(position) {
        scene.update_trail_range(entity.trail_handle, entity.trail.valid_samples());
    }
}
