pub mod orchestrator;
pub mod workflows;

pub use orchestrator::{Orchestrator, RunOptions};
