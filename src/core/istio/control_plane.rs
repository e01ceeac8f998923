use crate::config::settings::IstioSettings;
use crate::core::istio::manifests::{ServiceMeshMemberRoll, MEMBER_ROLL_NAME};
use crate::core::kube::PodList;
use crate::core::shell::Shell;
use crate::core::wait::wait_until;
use crate::domain::model::CommandSpec;
use crate::utils::error::{MoittError, Result};
use crate::utils::validation::validate_manifest_extension;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const INGRESS_ROUTE: &str = "istio-ingressgateway";

/// Fixture files the control plane is driven with.
#[derive(Debug, Clone)]
pub struct ControlPlaneFiles {
    /// ServiceMeshControlPlane CR used when `CR_FILE` is not set
    pub default_cr: PathBuf,
    /// Sample application for the smoke check
    pub sample: PathBuf,
}

impl ControlPlaneFiles {
    pub fn in_dir(testdata: &Path) -> Self {
        Self {
            default_cr: testdata.join("smcp.yaml"),
            sample: testdata.join("bookinfo.yaml"),
        }
    }
}

/// A Maistra control plane and its member namespaces.
pub struct ControlPlane {
    shell: Arc<Shell>,
    http: Client,
    settings: IstioSettings,
    files: ControlPlaneFiles,
}

impl ControlPlane {
    pub fn new(shell: Arc<Shell>, http: Client, settings: IstioSettings, files: ControlPlaneFiles) -> Self {
        Self {
            shell,
            http,
            settings,
            files,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.settings.control_plane_namespace
    }

    fn cr_path(&self, cr_file: Option<&str>) -> Result<PathBuf> {
        match cr_file {
            Some(file) => {
                validate_manifest_extension("CR_FILE", file)?;
                Ok(PathBuf::from(file))
            }
            None => Ok(self.files.default_cr.clone()),
        }
    }

    fn timeout_arg(&self) -> String {
        format!("--timeout={}s", self.settings.check_timeout_seconds)
    }

    /// Applies the control plane CR and waits for it to report Ready.
    pub async fn install(&self, cr_file: Option<&str>) -> Result<()> {
        let cr = self.cr_path(cr_file)?;
        tracing::info!("🚀 Installing control plane from {}", cr.display());

        self.shell.ensure_project(self.namespace()).await?;
        self.shell.apply_file(self.namespace(), &cr).await?;

        let smcp = format!("smcp/{}", self.settings.control_plane);
        let timeout = self.timeout_arg();
        self.shell
            .oc([
                "wait",
                "--for",
                "condition=Ready",
                smcp.as_str(),
                "-n",
                self.namespace(),
                timeout.as_str(),
            ])
            .await?;
        tracing::info!("✅ Control plane {} is ready", self.settings.control_plane);
        Ok(())
    }

    pub async fn create_ns(&self, namespaces: &[String]) -> Result<()> {
        for namespace in namespaces {
            self.shell.ensure_project(namespace).await?;
        }
        Ok(())
    }

    /// Enrolls the configured member namespaces into the mesh.
    pub async fn apply_smmr(&self) -> Result<()> {
        let members = &self.settings.member_namespaces;
        tracing::info!("Applying member roll with {:?}", members);
        let roll = ServiceMeshMemberRoll::new(self.namespace(), members);
        self.shell
            .apply_manifest(self.namespace(), &roll.to_yaml()?)
            .await?;
        Ok(())
    }

    /// Deploys the sample app, requests its product page through the ingress
    /// route and removes the sample again regardless of the outcome.
    pub async fn smoke_check(&self) -> Result<()> {
        tracing::info!("🧪 Running bookinfo smoke check");
        let result = self.request_sample().await;

        if let Err(e) = self
            .shell
            .delete_file(&self.settings.sample_namespace, &self.files.sample)
            .await
        {
            tracing::warn!("Failed to remove the sample app: {}", e);
        }
        result
    }

    async fn request_sample(&self) -> Result<()> {
        let sample_ns = self.settings.sample_namespace.as_str();
        self.shell.apply_file(sample_ns, &self.files.sample).await?;

        // Deployments create their pods after the apply returns.
        let shell = &self.shell;
        wait_until(
            "sample pods",
            self.settings.check_timeout(),
            self.settings.poll_interval(),
            move || async move {
                let pods = PodList::from_value(
                    shell.oc_json(["get", "pods", "-n", sample_ns]).await?,
                )?;
                Ok::<_, MoittError>(pods.all_settled())
            },
        )
        .await?;

        let route = self
            .shell
            .run(
                CommandSpec::new(
                    "oc",
                    [
                        "get",
                        "route",
                        INGRESS_ROUTE,
                        "-n",
                        self.namespace(),
                        "-o",
                        "jsonpath={.spec.host}",
                    ],
                )
                .quiet(),
            )
            .await?;
        let host = route.stdout.trim();
        if host.is_empty() {
            return Err(MoittError::SmokeCheckFailed {
                url: format!("route/{}", INGRESS_ROUTE),
                reason: "ingress route has no host".to_string(),
            });
        }

        let url = format!("http://{}/productpage", host);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MoittError::SmokeCheckFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(MoittError::SmokeCheckFailed {
                url,
                reason: format!("status {}", response.status()),
            });
        }
        tracing::info!("✅ {} returned 200", url);
        Ok(())
    }

    /// Waits until every pod in the control plane namespace is running.
    pub async fn check(&self) -> Result<()> {
        let shell = &self.shell;
        let namespace = self.namespace();
        wait_until(
            "control plane pods",
            self.settings.check_timeout(),
            self.settings.poll_interval(),
            move || async move {
                let pods = PodList::from_value(
                    shell.oc_json(["get", "pods", "-n", namespace]).await?,
                )?;
                if !pods.all_settled() {
                    tracing::debug!("Waiting on {:?}", pods.not_settled());
                }
                Ok::<_, MoittError>(pods.all_settled())
            },
        )
        .await
    }

    pub async fn uninstall(&self, cr_file: Option<&str>) -> Result<()> {
        let cr = self.cr_path(cr_file)?;
        tracing::info!("🧹 Removing control plane");

        self.shell
            .oc([
                "delete",
                "smmr",
                MEMBER_ROLL_NAME,
                "-n",
                self.namespace(),
                "--ignore-not-found",
            ])
            .await?;
        self.shell.delete_file(self.namespace(), &cr).await?;
        for namespace in &self.settings.member_namespaces {
            self.shell.delete_project(namespace).await?;
        }
        self.shell.delete_project(self.namespace()).await?;
        Ok(())
    }
}
