use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::PositionFix;

pub const FEET_TO_KM: f64 = 0.0003048;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct ScenePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ScenePosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, delta: ScenePosition) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            z: self.z + delta.z,
        }
    }

    #[cfg(test)]
    pub fn distance_to(&self, other: &ScenePosition) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Range {
    pub a: f64,
    pub b: f64,
}

impl Range {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn reversed(&self) -> Self {
        Self { a: self.b, b: self.a }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.b - self.a).is_normal()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub range_long: Range,
    pub range_lat: Range,
    pub range_map: Range,
    pub height_scaling: f64,
    /// Keeps aircraft at altitude 0 above the ground tiles.
    pub base_offset: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            range_long: Range::new(-100.546875, -97.55859375),
            range_lat: Range::new(20.79720143430699, 17.97873309555617),
            range_map: Range::new(85.0, -85.0),
            height_scaling: 1.3,
            base_offset: 0.1,
        }
    }
}

/// Affine remap of `value` from `from` onto `to`, end point `from.a` lands on `to.a`.
pub fn map_domain(value: f64, from: Range, to: Range) -> f64 {
    (value - from.a) / (from.b - from.a) * (to.b - to.a) + to.a
}

/// Maps geodetic coordinates into the scene frame.
///
/// Both horizontal axes use the scene range reversed, so `range_long.a`
/// lands on `range_map.b` and `range_long.b` on `range_map.a` (same for
/// latitude on the z axis).
#[derive(Debug, Clone)]
pub struct Projector {
    config: ProjectionConfig,
}

impl Projector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn height_scaling(&self) -> f64 {
        self.config.height_scaling
    }

    pub fn project(&self, longitude: f64, latitude: f64, altitude_ft: f64) -> ScenePosition {
        let out = self.config.range_map.reversed();
        ScenePosition::new(
            map_domain(longitude, self.config.range_long, out),
            altitude_ft * FEET_TO_KM * self.config.height_scaling + self.config.base_offset,
            map_domain(latitude, self.config.range_lat, out),
        )
    }

    pub fn project_fix(&self, fix: &PositionFix) -> ScenePosition {
        self.project(fix.longitude, fix.latitude, fix.altitude_ft)
    }

    pub fn yaw(track_deg: f64) -> f64 {
        (180.0 - track_deg).to_radians()
    }
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
