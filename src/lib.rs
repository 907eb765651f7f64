pub mod adapters;
pub mod app;
pub mod config;
pub mod container;
pub mod core;
pub mod domain;
pub mod feed;
pub mod format;
pub mod scrape;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::storage::{HistoryStore, LocalStorage};
pub use app::runner::{run_news, run_podcasts, Services};
pub use config::toml_config::AppConfig;
pub use container::{Finding, ImagePlan};
pub use core::{RunEngine, RunReport};
pub use utils::error::{MokhberError, Result};
