use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::live::LiveStatus;
use crate::web::api::error::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub tracked: usize,
    pub alive: usize,
    pub scene_nodes: usize,
    pub live: LiveStatus,
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Engine status", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let locked = state.live.lock();
    Ok(Json(StatusResponse {
        tracked: locked.table.len(),
        alive: locked.table.alive_count(),
        scene_nodes: locked.scene.len(),
        live: locked.status.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::api::test_state;

    #[tokio::test]
    async fn test_status_counts() {
        let Json(status) = get_status(State(test_state())).await.unwrap();
        assert_eq!(status.tracked, 2);
        assert_eq!(status.alive, 2);
        assert_eq!(status.scene_nodes, 4);
        assert_eq!(status.live.polls, 1);
        assert!(!status.live.running);

        let report = status.live.last_report.unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.rejected, 0);
    }
}
