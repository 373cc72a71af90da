use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::scene::SceneNode;
use crate::web::api::error::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SceneResponse {
    pub nodes: Vec<SceneNode>,
}

#[utoipa::path(
    get,
    path = "/api/scene",
    responses(
        (status = 200, description = "Visible scene nodes", body = SceneResponse)
    ),
    tag = "scene"
)]
pub async fn get_scene(State(state): State<AppState>) -> ApiResult<Json<SceneResponse>> {
    let locked = state.live.lock();
    let nodes = locked.scene.visible().cloned().collect();
    Ok(Json(SceneResponse { nodes }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;
    use crate::web::api::test_state;

    #[tokio::test]
    async fn test_scene_has_model_and_trail_per_aircraft() {
        let Json(scene) = get_scene(State(test_state())).await.unwrap();
        assert_eq!(scene.nodes.len(), 4);

        let models: Vec<_> = scene
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Aircraft)
            .collect();
        assert_eq!(models.len(), 2);
        assert!(models.iter().all(|n| n.position.is_some()));

        let mut trails = scene.nodes.iter().filter(|n| n.kind == NodeKind::Trail);
        assert!(trails.all(|n| n.trail.len() == 1));
    }
}
