use crate::core::shell::Shell;
use crate::utils::error::{MoittError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "registry-puller";
const SECRET_CONFIGMAP: &str = "registry-secret";

/// Deploys the registry puller, which copies the pull secret into every namespace.
pub struct RegistryPuller {
    shell: Arc<Shell>,
    secret_file: PathBuf,
    namespace: String,
    manifest: PathBuf,
    rollout_timeout: Duration,
}

impl RegistryPuller {
    pub fn new(
        shell: Arc<Shell>,
        secret_file: impl Into<PathBuf>,
        manifest: impl Into<PathBuf>,
        rollout_timeout: Duration,
    ) -> Self {
        Self {
            shell,
            secret_file: secret_file.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            manifest: manifest.into(),
            rollout_timeout,
        }
    }

    /// Prepares the namespace and the config map holding the pull secret.
    pub async fn build(&self) -> Result<()> {
        if !self.secret_file.is_file() {
            return Err(MoittError::InvalidConfigValueError {
                field: "PULL_SEC".to_string(),
                value: self.secret_file.display().to_string(),
                reason: "pull secret file does not exist".to_string(),
            });
        }

        tracing::info!("🔧 Preparing registry puller in {}", self.namespace);
        self.shell.ensure_project(&self.namespace).await?;

        let from_file = format!("--from-file=secret.yaml={}", self.secret_file.display());
        self.shell
            .oc([
                "delete",
                "configmap",
                SECRET_CONFIGMAP,
                "-n",
                self.namespace.as_str(),
                "--ignore-not-found",
            ])
            .await?;
        self.shell
            .oc([
                "create",
                "configmap",
                SECRET_CONFIGMAP,
                "-n",
                self.namespace.as_str(),
                from_file.as_str(),
            ])
            .await?;
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        tracing::info!("🚀 Deploying registry puller");
        self.shell.apply_file(&self.namespace, &self.manifest).await?;

        let timeout = format!("--timeout={}s", self.rollout_timeout.as_secs());
        self.shell
            .oc([
                "rollout",
                "status",
                "deployment/registry-puller",
                "-n",
                self.namespace.as_str(),
                timeout.as_str(),
            ])
            .await?;
        tracing::info!("✅ Registry puller is running");
        Ok(())
    }

    pub async fn remove(&self) -> Result<()> {
        tracing::info!("🧹 Removing registry puller");
        self.shell.delete_file(&self.namespace, &self.manifest).await?;
        self.shell.delete_project(&self.namespace).await?;
        Ok(())
    }
}
