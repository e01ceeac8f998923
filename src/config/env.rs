use crate::domain::model::{BotCredentials, Credentials};
use crate::utils::error::{MoittError, Result};

const DEFAULT_QE1_PASSWORD: &str = "qe1pw";

/// Values read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub aws_profile: Option<String>,
    pub pull_secret: Option<String>,
    pub cr_file: Option<String>,
    pub qe1_password: Option<String>,
    pub home: Option<String>,
    pub quay_user: Option<String>,
    pub quay_password: Option<String>,
    pub cluster_admin: Option<String>,
    pub admin_password: Option<String>,
    pub cluster_server: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 以自訂查詢函式建立，測試時不必修改行程環境
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        Self {
            aws_profile: get("AWS_PROFILE"),
            pull_secret: get("PULL_SEC"),
            cr_file: get("CR_FILE"),
            qe1_password: get("QE1_PWD"),
            home: get("HOME"),
            quay_user: get("QUAY_USER"),
            quay_password: get("QUAY_PWD"),
            cluster_admin: get("CLUSTER_ADMIN"),
            admin_password: get("ADMIN_PASS"),
            cluster_server: get("CLUSTER_SERVER"),
        }
    }

    pub fn require_profile(&self) -> Result<&str> {
        self.aws_profile
            .as_deref()
            .ok_or_else(|| MoittError::missing_env("AWS_PROFILE"))
    }

    pub fn require_pull_secret(&self) -> Result<&str> {
        self.pull_secret
            .as_deref()
            .ok_or_else(|| MoittError::missing_env("PULL_SEC"))
    }

    pub fn qe1_credentials(&self) -> Credentials {
        Credentials::new(
            "qe1",
            self.qe1_password
                .clone()
                .unwrap_or_else(|| DEFAULT_QE1_PASSWORD.to_string()),
        )
    }

    pub fn quay_credentials(&self) -> Result<Credentials> {
        let user = self
            .quay_user
            .clone()
            .ok_or_else(|| MoittError::missing_env("QUAY_USER"))?;
        let password = self
            .quay_password
            .clone()
            .ok_or_else(|| MoittError::missing_env("QUAY_PWD"))?;
        Ok(Credentials::new(user, password))
    }

    /// Only complete when all three of CLUSTER_ADMIN, ADMIN_PASS and CLUSTER_SERVER are set.
    pub fn bot_credentials(&self) -> Option<BotCredentials> {
        match (&self.cluster_admin, &self.admin_password, &self.cluster_server) {
            (Some(user), Some(password), Some(server)) => Some(BotCredentials {
                credentials: Credentials::new(user.clone(), password.clone()),
                server: server.clone(),
            }),
            _ => None,
        }
    }
}
