pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[doc(hidden)]
pub mod testing;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::process::ProcessRunner;
pub use app::{Orchestrator, RunOptions};
pub use config::{env::EnvConfig, settings::Settings};
pub use core::engine::RunReport;
pub use utils::error::{MoittError, Result};
