use crate::domain::model::{CommandOutput, CommandSpec, Component};
use crate::utils::error::{MoittError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion. Only spawn/IO problems are errors here.
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self.execute(spec).await?;
        if spec.check && !output.is_success() {
            return Err(MoittError::CommandFailed {
                command: spec.display(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[async_trait]
pub trait Workflow: Send + Sync {
    fn component(&self) -> Component;
    async fn install(&self) -> Result<()>;
    async fn uninstall(&self) -> Result<()>;
}
