use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AircraftId(String);

impl AircraftId {
    pub fn new(id: impl Into<String>) -> Self {
        AircraftId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    pub fn to_aircraft_id(&self) -> Option<AircraftId> {
        match self {
            RawId::Number(n) => Some(AircraftId(n.to_string())),
            RawId::Text(s) if s.trim().is_empty() => None,
            RawId::Text(s) => Some(AircraftId(s.trim().to_string())),
        }
    }
}

/// One telemetry record of a feed batch. Everything is optional on the wire,
/// a record without `Id` is rejected at merge time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "Id", default)]
    pub id: Option<RawId>,
    #[serde(rename = "Call", default)]
    pub callsign: Option<String>,
    #[serde(rename = "Long", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "Lat", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Alt", default)]
    pub altitude_ft: Option<f64>,
    #[serde(rename = "Trak", default)]
    pub track_deg: Option<f64>,
    #[serde(rename = "Spd", default)]
    pub speed_kts: Option<f64>,
    #[serde(rename = "Vsi", default)]
    pub vertical_speed_fpm: Option<f64>,
    #[serde(rename = "Sqk", default)]
    pub squawk: Option<String>,
    #[serde(rename = "Icao", default)]
    pub icao: Option<String>,
    #[serde(rename = "Reg", default)]
    pub registration: Option<String>,
    #[serde(rename = "Op", default)]
    pub operator: Option<String>,
    #[serde(rename = "Mdl", default)]
    pub model: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "To", default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude_ft: f64,
}

impl TelemetryRecord {
    pub fn aircraft_id(&self) -> Option<AircraftId> {
        self.id.as_ref().and_then(RawId::to_aircraft_id)
    }

    pub fn position_fix(&self) -> Option<PositionFix> {
        Some(PositionFix {
            longitude: self.longitude?,
            latitude: self.latitude?,
            altitude_ft: self.altitude_ft?,
        })
    }
}
