use crate::core::{Component, Operation, Workflow};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub component: Option<Component>,
    pub operation: Operation,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// False when no component was selected and nothing ran
    pub performed: bool,
}

impl RunReport {
    pub fn elapsed_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Runs the selected workflow in the requested direction.
pub struct Engine {
    workflow: Option<Box<dyn Workflow>>,
    operation: Operation,
}

impl Engine {
    pub fn new(workflow: Option<Box<dyn Workflow>>, operation: Operation) -> Self {
        Self {
            workflow,
            operation,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();

        let Some(workflow) = &self.workflow else {
            tracing::warn!("⚠️  No component selected, nothing to {}", self.operation);
            return Ok(RunReport {
                component: None,
                operation: self.operation,
                started_at,
                finished_at: Utc::now(),
                performed: false,
            });
        };

        let component = workflow.component();
        tracing::info!("▶️  {} {}", self.operation, component);
        match self.operation {
            Operation::Install => workflow.install().await?,
            Operation::Uninstall => workflow.uninstall().await?,
        }

        let report = RunReport {
            component: Some(component),
            operation: self.operation,
            started_at,
            finished_at: Utc::now(),
            performed: true,
        };
        tracing::info!(
            "✅ {} {} finished in {}s",
            self.operation,
            component,
            report.elapsed_seconds()
        );
        Ok(report)
    }
}
