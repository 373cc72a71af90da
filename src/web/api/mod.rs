pub mod aircraft;
pub mod error;
pub mod scene;
pub mod selection;
pub mod status;

#[cfg(test)]
pub(crate) fn test_state() -> crate::web::state::AppState {
    use crate::feed::parse_batch;
    use crate::live::LiveView;
    use crate::web::Config;
    use std::sync::Arc;

    const BATCH: &str = r#"{"acList": [
        {"Id": 13287923, "Call": "AMX463", "Long": -99.07, "Lat": 19.43, "Alt": 7350,
         "Trak": 45.0, "Spd": 140.0, "Vsi": 1200, "Op": "Aeromexico", "Mdl": "Boeing 737-800"},
        {"Id": 8008, "Call": "VIV100", "Long": -99.5, "Lat": 19.1, "Alt": 24000,
         "Trak": 270.0, "Spd": 420.0}
    ]}"#;

    let config = Config::default();
    let view = LiveView::from_config(&config);
    let live = view.handle();
    let batch = parse_batch(BATCH).expect("fixture parses");
    live.lock().ingest(batch, chrono::Utc::now());

    crate::web::state::AppState {
        config: Arc::new(config),
        live,
    }
}
