use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::tracking::{AircraftEntity, AircraftId, Liveness, ScenePosition};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AircraftRow {
    pub id: String,
    pub label: String,
    pub callsign: Option<String>,
    pub icao: Option<String>,
    pub altitude_ft: Option<f64>,
    pub speed_kts: Option<f64>,
    pub track_deg: Option<f64>,
    pub liveness: Liveness,
    pub last_seen: DateTime<Utc>,
    pub trail_length: usize,
    pub selected: bool,
}

impl AircraftRow {
    pub fn from_entity(entity: &AircraftEntity, selected: bool) -> Self {
        let t = &entity.telemetry;
        AircraftRow {
            id: entity.id.to_string(),
            label: entity.label(),
            callsign: t.callsign.clone(),
            icao: t.icao.clone(),
            altitude_ft: t.altitude_ft,
            speed_kts: t.speed_kts,
            track_deg: t.track_deg,
            liveness: entity.liveness,
            last_seen: entity.last_seen,
            trail_length: entity.trail.len(),
            selected,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AircraftDetail {
    #[serde(flatten)]
    pub row: AircraftRow,
    pub registration: Option<String>,
    pub operator: Option<String>,
    pub model: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub squawk: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub vertical_speed_fpm: Option<f64>,
    pub scene_position: Option<ScenePosition>,
    pub heading_rad: f64,
    pub visible: bool,
    pub trail_capacity: usize,
    pub trail: Vec<ScenePosition>,
}

impl AircraftDetail {
    pub fn from_entity(entity: &AircraftEntity, selected: bool, visible: bool) -> Self {
        let t = &entity.telemetry;
        AircraftDetail {
            row: AircraftRow::from_entity(entity, selected),
            registration: t.registration.clone(),
            operator: t.operator.clone(),
            model: t.model.clone(),
            from: t.from.clone(),
            to: t.to.clone(),
            squawk: t.squawk.clone(),
            longitude: t.longitude,
            latitude: t.latitude,
            vertical_speed_fpm: t.vertical_speed_fpm,
            scene_position: entity.scene_position,
            heading_rad: entity.heading_rad,
            visible,
            trail_capacity: entity.trail.capacity(),
            trail: entity.trail.iter().copied().collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/aircraft",
    responses(
        (status = 200, description = "All tracked aircraft", body = Vec<AircraftRow>)
    ),
    tag = "aircraft"
)]
pub async fn list_aircraft(State(state): State<AppState>) -> ApiResult<Json<Vec<AircraftRow>>> {
    let locked = state.live.lock();
    let selected = locked.selection.selected();

    let mut rows: Vec<AircraftRow> = locked
        .table
        .iter()
        .map(|e| AircraftRow::from_entity(e, selected == Some(&e.id)))
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/aircraft/{id}",
    params(
        ("id" = String, Path, description = "Aircraft identity as delivered by the feed")
    ),
    responses(
        (status = 200, description = "Aircraft detail", body = AircraftDetail),
        (status = 404, description = "Unknown aircraft", body = ErrorResponse)
    ),
    tag = "aircraft"
)]
pub async fn get_aircraft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AircraftDetail>> {
    let id = AircraftId::new(id);
    let locked = state.live.lock();
    let entity = locked
        .table
        .get(&id)
        .ok_or(ApiError::NotFound("aircraft_not_found"))?;
    let selected = locked.selection.selected() == Some(&id);
    let visible = locked.scene.is_attached(entity.aircraft_handle);

    Ok(Json(AircraftDetail::from_entity(entity, selected, visible)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::api::test_state;

    #[tokio::test]
    async fn test_list_sorted_by_label() {
        let state = test_state();
        let Json(rows) = list_aircraft(State(state)).await.unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["AMX463", "VIV100"]);
        assert!(rows.iter().all(|r| r.liveness == Liveness::Alive));
        assert_eq!(rows[0].trail_length, 1);
        assert!(!rows[0].selected);
    }

    #[tokio::test]
    async fn test_detail_and_not_found() {
        let state = test_state();
        let Json(detail) = get_aircraft(State(state.clone()), Path("13287923".into()))
            .await
            .unwrap();
        assert_eq!(detail.row.callsign.as_deref(), Some("AMX463"));
        assert_eq!(detail.operator.as_deref(), Some("Aeromexico"));
        assert_eq!(detail.trail.len(), 1);
        assert!(detail.scene_position.is_some());
        assert!(detail.visible);
        assert_eq!(detail.trail_capacity, 600);

        let missing = get_aircraft(State(state), Path("nope".into())).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }
}
