pub mod engine;
pub mod istio;
pub mod kube;
pub mod ocp;
pub mod puller;
pub mod shell;
pub mod wait;

pub use crate::domain::model::{CommandOutput, CommandSpec, Component, Operation};
pub use crate::domain::ports::{CommandRunner, Workflow};
pub use crate::utils::error::Result;
