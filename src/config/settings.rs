use crate::utils::error::{MoittError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mirror: MirrorSettings,
    pub paths: PathSettings,
    pub download: DownloadSettings,
    pub istio: IstioSettings,
    pub quay: QuaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    pub base_url: String,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            base_url: "https://mirror.openshift.com/pub/openshift-v4/clients/ocp".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// 下載與解壓縮的工作目錄
    pub work_dir: PathBuf,
    /// oc/kubectl 安裝位置，未設定時使用 $HOME/bin
    pub bin_dir: Option<PathBuf>,
    pub testdata_dir: PathBuf,
    pub user_script: PathBuf,
    pub install_config: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            bin_dir: None,
            testdata_dir: PathBuf::from("testdata"),
            user_script: PathBuf::from("scripts/user-creation.sh"),
            install_config: PathBuf::from("install-config.yaml"),
        }
    }
}

impl PathSettings {
    pub fn bin_dir(&self, home: Option<&str>) -> Result<PathBuf> {
        if let Some(dir) = &self.bin_dir {
            return Ok(dir.clone());
        }
        home.map(|home| Path::new(home).join("bin"))
            .ok_or_else(|| MoittError::MissingConfigError {
                field: "paths.bin_dir (or HOME)".to_string(),
            })
    }

    pub fn testdata(&self, file: &str) -> PathBuf {
        self.testdata_dir.join(file)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub accept_invalid_certs: bool,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IstioSettings {
    pub operator_namespace: String,
    pub control_plane: String,
    pub control_plane_namespace: String,
    pub sample_namespace: String,
    pub member_namespaces: Vec<String>,
    pub check_timeout_seconds: u64,
    pub poll_interval_seconds: u64,
}

impl Default for IstioSettings {
    fn default() -> Self {
        Self {
            operator_namespace: "openshift-operators".to_string(),
            control_plane: "basic-install".to_string(),
            control_plane_namespace: "istio-system".to_string(),
            sample_namespace: "bookinfo".to_string(),
            member_namespaces: ["bookinfo", "foo", "bar", "legacy"]
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            check_timeout_seconds: 600,
            poll_interval_seconds: 10,
        }
    }
}

impl IstioSettings {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuaySettings {
    pub login_url: String,
    pub registry_namespace: String,
}

impl Default for QuaySettings {
    fn default() -> Self {
        Self {
            login_url: "https://quay.io/cnr/api/v1/users/login".to_string(),
            registry_namespace: "maistra".to_string(),
        }
    }
}

impl Settings {
    /// 載入設定檔；檔案不存在時使用預設值
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MoittError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 ${VAR} 形式的環境變數，未設定者保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MoittError::config(e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("mirror.base_url", &self.mirror.base_url)?;
        validate_url("quay.login_url", &self.quay.login_url)?;
        validate_path(
            "paths.work_dir",
            &self.paths.work_dir.to_string_lossy(),
        )?;
        validate_positive_number(
            "istio.check_timeout_seconds",
            self.istio.check_timeout_seconds,
            1,
        )?;
        validate_positive_number(
            "istio.poll_interval_seconds",
            self.istio.poll_interval_seconds,
            1,
        )?;
        if let Some(timeout) = self.download.timeout_seconds {
            validate_positive_number("download.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
