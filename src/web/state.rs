use std::sync::Arc;

use crate::live::LiveHandle;

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub live: LiveHandle,
}
