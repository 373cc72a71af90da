use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tracking::AircraftId;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectionRequest {
    /// `null` clears the selection.
    pub id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionResponse {
    pub id: Option<String>,
    pub changed: bool,
}

#[utoipa::path(
    get,
    path = "/api/selection",
    responses(
        (status = 200, description = "Currently selected aircraft", body = SelectionResponse)
    ),
    tag = "selection"
)]
pub async fn get_selection(State(state): State<AppState>) -> ApiResult<Json<SelectionResponse>> {
    let locked = state.live.lock();
    Ok(Json(SelectionResponse {
        id: locked.selection.selected().map(AircraftId::to_string),
        changed: false,
    }))
}

#[utoipa::path(
    put,
    path = "/api/selection",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection updated", body = SelectionResponse),
        (status = 400, description = "Blank id", body = ErrorResponse),
        (status = 404, description = "Unknown aircraft", body = ErrorResponse)
    ),
    tag = "selection"
)]
pub async fn put_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let id = match request.id {
        Some(raw) if raw.trim().is_empty() => {
            return Err(ApiError::Validation("id must not be blank".into()));
        }
        Some(raw) => Some(AircraftId::new(raw.trim())),
        None => None,
    };

    let mut locked = state.live.lock();
    if let Some(id) = &id {
        if !locked.table.contains(id) {
            return Err(ApiError::NotFound("aircraft_not_found"));
        }
    }

    let changed = locked.selection.notify_selected(id);
    Ok(Json(SelectionResponse {
        id: locked.selection.selected().map(AircraftId::to_string),
        changed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::api::test_state;

    fn request(id: Option<&str>) -> Json<SelectionRequest> {
        Json(SelectionRequest {
            id: id.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_select_then_clear() {
        let state = test_state();

        let Json(res) = put_selection(State(state.clone()), request(Some("8008")))
            .await
            .unwrap();
        assert_eq!(res.id.as_deref(), Some("8008"));
        assert!(res.changed);

        let Json(res) = put_selection(State(state.clone()), request(Some("8008")))
            .await
            .unwrap();
        assert!(!res.changed);

        let Json(res) = get_selection(State(state.clone())).await.unwrap();
        assert_eq!(res.id.as_deref(), Some("8008"));

        let Json(res) = put_selection(State(state), request(None)).await.unwrap();
        assert!(res.id.is_none());
        assert!(res.changed);
    }

    #[tokio::test]
    async fn test_rejects_unknown_and_blank() {
        let state = test_state();
        let res = put_selection(State(state.clone()), request(Some("ghost"))).await;
        assert!(matches!(res, Err(ApiError::NotFound(_))));

        let res = put_selection(State(state.clone()), request(Some("  "))).await;
        assert!(matches!(res, Err(ApiError::Validation(_))));

        assert!(state.live.lock().selection.selected().is_none());
    }
}
