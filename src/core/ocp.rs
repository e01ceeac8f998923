use crate::adapters::archive::{create_dir_with_mode, move_file, set_mode, symlink, unpack_tar_gz};
use crate::adapters::download::Downloader;
use crate::core::shell::Shell;
use crate::domain::model::{BotCredentials, CommandSpec, Credentials};
use crate::utils::error::{MoittError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parameters for an [`OcpCluster`].
#[derive(Debug, Clone)]
pub struct OcpOptions {
    /// AWS profile name
    pub profile: String,
    /// OpenShift cluster assets directory
    pub assets: PathBuf,
    /// OpenShift installer version
    pub version: String,
    pub mirror_url: String,
    /// Where tarballs are unpacked and the installer binary is staged
    pub work_dir: PathBuf,
    pub install_config: PathBuf,
    /// Destination for oc and kubectl
    pub bin_dir: Option<PathBuf>,
    pub user_script: PathBuf,
}

/// Installs or uninstalls an OCP cluster on AWS by driving `openshift-install` and `oc`.
pub struct OcpCluster {
    shell: Arc<Shell>,
    downloader: Downloader,
    options: OcpOptions,
}

impl OcpCluster {
    pub fn new(shell: Arc<Shell>, downloader: Downloader, options: OcpOptions) -> Self {
        Self {
            shell,
            downloader,
            options,
        }
    }

    pub fn installer_url(&self) -> String {
        let v = &self.options.version;
        format!(
            "{}/{}/openshift-install-linux-{}.tar.gz",
            self.options.mirror_url.trim_end_matches('/'),
            v,
            v
        )
    }

    pub fn client_url(&self) -> String {
        let v = &self.options.version;
        format!(
            "{}/{}/openshift-client-linux-{}.tar.gz",
            self.options.mirror_url.trim_end_matches('/'),
            v,
            v
        )
    }

    pub fn kubeconfig(&self) -> PathBuf {
        self.options.assets.join("auth").join("kubeconfig")
    }

    pub fn kubeadmin_password_file(&self) -> PathBuf {
        self.options.assets.join("auth").join("kubeadmin-password")
    }

    fn installer_path(&self) -> PathBuf {
        self.options.work_dir.join("openshift-install")
    }

    fn client_dir(&self) -> PathBuf {
        self.options.work_dir.join("client")
    }

    pub fn export_kubeconfig(&self) {
        self.shell
            .export("KUBECONFIG", self.kubeconfig().to_string_lossy());
    }

    async fn check_awscli(&self) -> Result<()> {
        let hint = "Please run scripts/setup.sh to install the awscli first.".to_string();
        match self
            .shell
            .run(CommandSpec::new("aws", ["--version"]).unchecked())
            .await
        {
            Ok(output) if output.is_success() => Ok(()),
            Ok(_) | Err(MoittError::ToolNotFound { .. }) => Err(MoittError::ToolNotFound {
                tool: "aws".to_string(),
                hint,
            }),
            Err(e) => Err(e),
        }
    }

    /// Downloads a tarball into the work dir, unpacks it into `client/` and removes it.
    async fn fetch_and_unpack(&self, url: &str, tarball: &str) -> Result<()> {
        let archive = self.options.work_dir.join(tarball);
        self.downloader.fetch_to_file(url, &archive).await?;
        unpack_tar_gz(&archive, &self.client_dir()).await?;
        std::fs::remove_file(&archive)?;
        Ok(())
    }

    async fn stage_installer(&self) -> Result<()> {
        tracing::info!("📦 Downloading the installer...");
        self.fetch_and_unpack(&self.installer_url(), "openshift-install.tar.gz")
            .await?;
        let installer = self.installer_path();
        move_file(&self.client_dir().join("openshift-install"), &installer)?;
        set_mode(&installer, 0o775)?;
        Ok(())
    }

    async fn stage_client(&self) -> Result<()> {
        tracing::info!("📦 Downloading the oc client...");
        self.fetch_and_unpack(&self.client_url(), "oc.tar.gz").await?;

        let client = self.client_dir();
        let oc = client.join("oc");
        let kubectl = client.join("kubectl");
        set_mode(&oc, 0o755)?;
        if kubectl.is_file() {
            set_mode(&kubectl, 0o755)?;
        } else {
            symlink(Path::new("oc"), &kubectl)?;
        }

        let bin_dir = self
            .options
            .bin_dir
            .clone()
            .ok_or_else(|| MoittError::MissingConfigError {
                field: "paths.bin_dir (or HOME)".to_string(),
            })?;
        move_file(&oc, &bin_dir.join("oc"))?;
        move_file(&kubectl, &bin_dir.join("kubectl"))?;
        tracing::info!("oc and kubectl installed into {}", bin_dir.display());
        Ok(())
    }

    /// Downloads the installer and deploys a cluster on AWS, then installs the
    /// oc client with kubectl next to it.
    pub async fn install(&self) -> Result<()> {
        self.check_awscli().await?;
        self.shell.export("AWS_PROFILE", &self.options.profile);

        self.stage_installer().await?;

        tracing::info!("🚀 Deploying the cluster...");
        create_dir_with_mode(&self.options.assets, 0o775)?;
        if self.options.install_config.is_file() {
            let file_name = self
                .options
                .install_config
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("install-config.yaml"));
            std::fs::copy(
                &self.options.install_config,
                self.options.assets.join(file_name),
            )?;
        }

        let dir_arg = format!("--dir={}", self.options.assets.display());
        let create = CommandSpec::new(
            self.installer_path().to_string_lossy(),
            [dir_arg.as_str(), "create", "cluster"],
        )
        .unchecked();
        let output = self.shell.run(create).await?;
        if !output.is_success() {
            // installer 常在叢集仍在啟動時逾時，不中斷
            tracing::warn!(
                "openshift-install create cluster exited with {:?}",
                output.code
            );
        }
        tracing::info!("Cluster deployment completed.");
        self.export_kubeconfig();

        self.stage_client().await?;

        tracing::info!("Check cluster info");
        let info = self
            .shell
            .run(CommandSpec::new("kubectl", ["cluster-info"]).unchecked())
            .await?;
        if !info.is_success() {
            tracing::warn!("kubectl cluster-info exited with {:?}", info.code);
        }
        Ok(())
    }

    /// Destroys the cluster and removes the assets directory and installer.
    pub async fn uninstall(&self) -> Result<()> {
        self.shell.export("AWS_PROFILE", &self.options.profile);
        self.stage_installer().await?;

        tracing::info!("🧨 Destroying the cluster...");
        let dir_arg = format!("--dir={}", self.options.assets.display());
        self.shell
            .run(CommandSpec::new(
                self.installer_path().to_string_lossy(),
                [
                    dir_arg.as_str(),
                    "destroy",
                    "cluster",
                    "--log-level=debug",
                ],
            ))
            .await?;

        tracing::info!("Uninstall completed");
        if self.options.assets.exists() {
            std::fs::remove_dir_all(&self.options.assets)?;
        }
        std::fs::remove_file(self.installer_path())?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.export_kubeconfig();
        let password = credentials.password.trim_end_matches(['\r', '\n']);
        self.shell
            .oc(["login", "-u", credentials.username.as_str(), "-p", password])
            .await?;
        tracing::info!("🔑 Logged in as {}", credentials.username);
        Ok(())
    }

    pub async fn login_bot(&self, bot: &BotCredentials) -> Result<()> {
        let server = format!("--server={}", bot.server);
        self.shell
            .oc([
                "login",
                "-u",
                bot.credentials.username.as_str(),
                "-p",
                bot.credentials.password.as_str(),
                server.as_str(),
                "--insecure-skip-tls-verify=true",
            ])
            .await?;
        tracing::info!("🔑 Logged in as {} on {}", bot.credentials.username, bot.server);
        Ok(())
    }

    /// Logs in as kubeadmin with the password the installer left in the assets
    /// directory, or with the bot account when that file does not exist.
    pub async fn login_kubeadmin(&self, bot: Option<&BotCredentials>) -> Result<()> {
        let path = self.kubeadmin_password_file();
        match std::fs::read_to_string(&path) {
            Ok(password) => self.login(&Credentials::new("kubeadmin", password)).await,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match bot {
                Some(bot) => {
                    tracing::info!("{} not found, using bot account", path.display());
                    self.login_bot(bot).await
                }
                None => Err(MoittError::IoError(e)),
            },
            Err(e) => Err(MoittError::IoError(e)),
        }
    }

    pub async fn logout(&self) {
        match self.shell.run(CommandSpec::new("oc", ["logout"]).unchecked()).await {
            Ok(output) if output.is_success() => tracing::debug!("Logged out"),
            Ok(output) => tracing::warn!("oc logout exited with {:?}", output.code),
            Err(e) => tracing::warn!("oc logout failed: {}", e),
        }
    }

    /// Creates the test users qe1 and qe2.
    pub async fn create_users(&self) -> Result<()> {
        tracing::info!("👥 Create test users");
        let output = self
            .shell
            .run(
                CommandSpec::new(self.options.user_script.to_string_lossy(), Vec::<String>::new())
                    .unchecked(),
            )
            .await?;
        if !output.is_success() {
            tracing::warn!("User creation script exited with {:?}", output.code);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DownloadSettings;
    use crate::domain::model::CommandOutput;
    use crate::testing::{build_tar_gz, RecordingRunner};
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn cluster(runner: Arc<RecordingRunner>, dir: &TempDir, mirror: String) -> OcpCluster {
        let shell = Arc::new(Shell::new(runner));
        let options = OcpOptions {
            profile: "qe".to_string(),
            assets: dir.path().join("assets"),
            version: "4.3.9".to_string(),
            mirror_url: mirror,
            work_dir: dir.path().to_path_buf(),
            install_config: dir.path().join("install-config.yaml"),
            bin_dir: Some(dir.path().join("bin")),
            user_script: PathBuf::from("scripts/user-creation.sh"),
        };
        OcpCluster::new(
            shell,
            Downloader::new(&DownloadSettings::default()).unwrap(),
            options,
        )
    }

    #[test]
    fn test_urls_follow_version() {
        let dir = TempDir::new().unwrap();
        let ocp = cluster(
            Arc::new(RecordingRunner::new()),
            &dir,
            "https://mirror.openshift.com/pub/openshift-v4/clients/ocp/".to_string(),
        );
        assert_eq!(
            ocp.installer_url(),
            "https://mirror.openshift.com/pub/openshift-v4/clients/ocp/4.3.9/openshift-install-linux-4.3.9.tar.gz"
        );
        assert_eq!(
            ocp.client_url(),
            "https://mirror.openshift.com/pub/openshift-v4/clients/ocp/4.3.9/openshift-client-linux-4.3.9.tar.gz"
        );
        assert!(ocp.kubeconfig().ends_with("assets/auth/kubeconfig"));
    }

    #[tokio::test]
    async fn test_install_requires_awscli() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        runner.respond("aws --version", CommandOutput::failure(127, "not found"));
        let ocp = cluster(runner.clone(), &dir, "http://127.0.0.1:1".to_string());

        let err = ocp.install().await.unwrap_err();
        assert!(matches!(err, MoittError::ToolNotFound { ref tool, .. } if tool == "aws"));
        assert_eq!(runner.lines(), vec!["aws --version"]);
    }

    #[tokio::test]
    async fn test_install_stages_binaries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("install-config.yaml"), "apiVersion: v1\n").unwrap();

        let server = MockServer::start();
        let installer = server.mock(|when, then| {
            when.method(GET).path("/4.3.9/openshift-install-linux-4.3.9.tar.gz");
            then.status(200)
                .body(build_tar_gz(&[("openshift-install", &b"installer"[..])]).unwrap());
        });
        let client = server.mock(|when, then| {
            when.method(GET).path("/4.3.9/openshift-client-linux-4.3.9.tar.gz");
            then.status(200).body(build_tar_gz(&[("oc", &b"oc"[..])]).unwrap());
        });

        let runner = Arc::new(RecordingRunner::new());
        // 非零結束不中斷安裝
        runner.respond("create cluster", CommandOutput::failure(1, "timeout"));
        let ocp = cluster(runner.clone(), &dir, server.base_url());

        ocp.install().await.unwrap();

        installer.assert();
        client.assert();
        assert!(dir.path().join("openshift-install").is_file());
        assert!(dir.path().join("assets/install-config.yaml").is_file());
        assert!(dir.path().join("bin/oc").is_file());
        let kubectl = dir.path().join("bin/kubectl");
        assert!(std::fs::symlink_metadata(&kubectl).is_ok());
        #[cfg(unix)]
        assert_eq!(std::fs::read_link(&kubectl).unwrap(), Path::new("oc"));
        assert!(!dir.path().join("oc.tar.gz").exists());

        let lines = runner.lines();
        assert_eq!(lines[0], "aws --version");
        assert!(lines[1].ends_with("create cluster"));
        assert!(lines[1].contains("--dir="));
        assert_eq!(lines[2], "kubectl cluster-info");

        let calls = runner.calls();
        assert!(calls[2]
            .env
            .iter()
            .any(|(k, v)| k == "AWS_PROFILE" && v == "qe"));
        assert!(calls[2].env.iter().any(|(k, _)| k == "KUBECONFIG"));
    }

    fn installer_mock(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET).path("/4.3.9/openshift-install-linux-4.3.9.tar.gz");
            then.status(200)
                .body(build_tar_gz(&[("openshift-install", &b"installer"[..])]).unwrap());
        })
    }

    #[tokio::test]
    async fn test_uninstall_destroys_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        std::fs::create_dir_all(assets.join("auth")).unwrap();
        std::fs::write(assets.join("metadata.json"), "{}").unwrap();

        let server = MockServer::start();
        let installer = installer_mock(&server);
        let runner = Arc::new(RecordingRunner::new());
        let ocp = cluster(runner.clone(), &dir, server.base_url());

        ocp.uninstall().await.unwrap();

        installer.assert();
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].program.ends_with("openshift-install"));
        assert_eq!(
            calls[0].args,
            vec![
                format!("--dir={}", assets.display()),
                "destroy".to_string(),
                "cluster".to_string(),
                "--log-level=debug".to_string(),
            ]
        );
        assert!(calls[0].check);
        assert!(calls[0]
            .env
            .iter()
            .any(|(k, v)| k == "AWS_PROFILE" && v == "qe"));
        assert!(!assets.exists());
        assert!(!dir.path().join("openshift-install").exists());
    }

    #[tokio::test]
    async fn test_failed_destroy_keeps_assets() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("metadata.json"), "{}").unwrap();

        let server = MockServer::start();
        let _installer = installer_mock(&server);
        let runner = Arc::new(RecordingRunner::new());
        runner.respond(
            "destroy cluster",
            CommandOutput::failure(1, "level=fatal msg=\"Failed to destroy cluster\""),
        );
        let ocp = cluster(runner.clone(), &dir, server.base_url());

        let err = ocp.uninstall().await.unwrap_err();

        assert!(matches!(err, MoittError::CommandFailed { code: Some(1), .. }));
        assert!(assets.join("metadata.json").is_file());
        assert!(dir.path().join("openshift-install").is_file());
    }

    #[tokio::test]
    async fn test_login_trims_password_file() {
        let dir = TempDir::new().unwrap();
        let auth = dir.path().join("assets/auth");
        std::fs::create_dir_all(&auth).unwrap();
        std::fs::write(auth.join("kubeadmin-password"), "abcde-12345\n").unwrap();

        let runner = Arc::new(RecordingRunner::new());
        let ocp = cluster(runner.clone(), &dir, "http://127.0.0.1:1".to_string());
        ocp.login_kubeadmin(None).await.unwrap();

        let calls = runner.calls();
        assert_eq!(
            calls[0].args,
            vec!["login", "-u", "kubeadmin", "-p", "abcde-12345"]
        );
    }

    #[tokio::test]
    async fn test_login_falls_back_to_bot() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let ocp = cluster(runner.clone(), &dir, "http://127.0.0.1:1".to_string());

        assert!(ocp.login_kubeadmin(None).await.is_err());

        let bot = BotCredentials {
            credentials: Credentials::new("ci-admin", "pw"),
            server: "https://api.ci.example.com:6443".to_string(),
        };
        ocp.login_kubeadmin(Some(&bot)).await.unwrap();
        assert_eq!(
            runner.lines(),
            vec!["oc login -u ci-admin -p *** --server=https://api.ci.example.com:6443 --insecure-skip-tls-verify=true"]
        );
    }

    #[tokio::test]
    async fn test_logout_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        runner.respond("oc logout", CommandOutput::failure(1, "not logged in"));
        let ocp = cluster(runner.clone(), &dir, "http://127.0.0.1:1".to_string());

        ocp.logout().await;
        assert_eq!(runner.lines(), vec!["oc logout"]);
    }
}
