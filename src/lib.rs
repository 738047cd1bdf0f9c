pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod heatmap;
pub mod models;
pub mod registry;
pub mod report;
pub mod stats;
pub mod storage;
pub mod state;

pub use app::router;
pub use config::Config;
pub use registry::Registry;
pub use state::AppState;
pub use storage::{load_registry, persist_registry};
