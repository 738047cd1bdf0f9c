use crate::config::Config;
use crate::registry::Registry;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub heatmap_weeks: u32,
    pub registry: Arc<Mutex<Registry>>,
}

impl AppState {
    pub fn new(config: &Config, registry: Registry) -> Self {
        Self {
            data_path: config.data_path.clone(),
            heatmap_weeks: config.heatmap_weeks,
            registry: Arc::new(Mutex::new(registry)),
        }
    }
}
