use utoipa::OpenApi;

use super::api::aircraft::{AircraftDetail, AircraftRow};
use super::api::error::ErrorResponse;
use super::api::scene::SceneResponse;
use super::api::selection::{SelectionRequest, SelectionResponse};
use super::api::status::StatusResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::aircraft::list_aircraft,
        super::api::aircraft::get_aircraft,
        super::api::scene::get_scene,
        super::api::selection::get_selection,
        super::api::selection::put_selection,
        super::api::status::get_status,
    ),
    components(
        schemas(
            AircraftRow,
            AircraftDetail,
            SceneResponse,
            SelectionRequest,
            SelectionResponse,
            StatusResponse,
            ErrorResponse,
            crate::live::LiveStatus,
            crate::scene::SceneNode,
            crate::scene::NodeKind,
            crate::scene::RenderHandle,
            crate::tracking::Liveness,
            crate::tracking::ScenePosition,
            crate::tracking::IngestReport,
            crate::tracking::SweepReport,
        )
    ),
    info(
        title = "Plane-O-Mat API",
        description = "Live aircraft tracking state for the 3D viewer",
        version = "0.1.0"
    ),
    tags(
        (name = "aircraft", description = "Tracked aircraft"),
        (name = "scene", description = "Renderable scene"),
        (name = "selection", description = "Table and detail panel selection"),
        (name = "status", description = "Poll and frame loop status")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/aircraft",
            "/api/aircraft/{id}",
            "/api/scene",
            "/api/selection",
            "/api/status",
        ] {
            assert!(paths.contains(&expected), "missing {}", expected);
        }
    }
}
