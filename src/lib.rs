pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpResultClient;
pub use app::pipelines::result_pipeline::ResultPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{csv_output::to_csv, etl::EtlEngine, scheduler::Extractor};
pub use domain::session::generate_sessions;
pub use utils::error::{ExtractError, Result};
