use crate::adapters::download::Downloader;
use crate::app::workflows::{IstioWorkflow, OcpWorkflow, PullerWorkflow};
use crate::config::env::EnvConfig;
use crate::config::settings::Settings;
use crate::core::engine::{Engine, RunReport};
use crate::core::istio::{ControlPlane, ControlPlaneFiles, Operator};
use crate::core::ocp::{OcpCluster, OcpOptions};
use crate::core::puller::RegistryPuller;
use crate::core::shell::Shell;
use crate::core::{CommandRunner, Component, Operation, Workflow};
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// What to run, as selected on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub component: Option<Component>,
    pub operation: Operation,
    pub assets: PathBuf,
    pub version: String,
    pub quay: bool,
    pub release: String,
}

#[cfg(feature = "cli")]
impl From<&crate::config::CliConfig> for RunOptions {
    fn from(config: &crate::config::CliConfig) -> Self {
        Self {
            component: config.component,
            operation: config.operation(),
            assets: PathBuf::from(&config.directory),
            version: config.version.clone(),
            quay: config.quay,
            release: config.release.clone(),
        }
    }
}

/// Wires the cluster, the components and the selected workflow together.
pub struct Orchestrator {
    shell: Arc<Shell>,
    engine: Engine,
}

impl Orchestrator {
    /// Fails on a missing `AWS_PROFILE` or `PULL_SEC` before any command runs.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        settings: Settings,
        env: EnvConfig,
        options: RunOptions,
    ) -> Result<Self> {
        let profile = env.require_profile()?.to_string();
        let pull_secret = env.require_pull_secret()?.to_string();

        let shell = Arc::new(Shell::new(runner));
        let downloader = Downloader::new(&settings.download)?;
        let http = downloader.client().clone();

        let bin_dir = match settings.paths.bin_dir(env.home.as_deref()) {
            Ok(dir) => Some(dir),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        };
        let cluster = Arc::new(OcpCluster::new(
            shell.clone(),
            downloader,
            OcpOptions {
                profile,
                assets: options.assets.clone(),
                version: options.version.clone(),
                mirror_url: settings.mirror.base_url.clone(),
                work_dir: settings.paths.work_dir.clone(),
                install_config: settings.paths.install_config.clone(),
                bin_dir,
                user_script: settings.paths.user_script.clone(),
            },
        ));
        cluster.export_kubeconfig();

        let bot = env.bot_credentials();
        let workflow: Option<Box<dyn Workflow>> = match options.component {
            None => None,
            Some(Component::Ocp) => Some(Box::new(OcpWorkflow::new(cluster, bot))),
            Some(Component::RegistryPuller) => {
                let puller = RegistryPuller::new(
                    shell.clone(),
                    pull_secret,
                    settings.paths.testdata("registry-puller.yaml"),
                    settings.istio.check_timeout(),
                );
                Some(Box::new(PullerWorkflow::new(cluster, bot, puller)))
            }
            Some(Component::Istio) => {
                let quay_credentials = if options.quay && options.operation == Operation::Install {
                    Some(env.quay_credentials()?)
                } else {
                    None
                };
                let operator = Operator::new(
                    shell.clone(),
                    http.clone(),
                    &options.release,
                    options.quay,
                    settings.istio.clone(),
                    settings.quay.clone(),
                );
                let control_plane = ControlPlane::new(
                    shell.clone(),
                    http,
                    settings.istio.clone(),
                    ControlPlaneFiles::in_dir(&settings.paths.testdata_dir),
                );
                Some(Box::new(IstioWorkflow::new(
                    cluster,
                    bot,
                    operator,
                    control_plane,
                    env.qe1_credentials(),
                    options.quay,
                    quay_credentials,
                    env.cr_file.clone(),
                    settings.istio.member_namespaces.clone(),
                )))
            }
        };

        Ok(Self {
            shell,
            engine: Engine::new(workflow, options.operation),
        })
    }

    pub fn shell(&self) -> &Arc<Shell> {
        &self.shell
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.engine.run().await
    }
}
