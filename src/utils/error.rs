use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoittError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Manifest rendering error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Missing {name} environment variable")]
    MissingEnvError { name: String },

    #[error("Required tool '{tool}' is not available: {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("Command `{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Download of {url} not complete: expected {expected} bytes, wrote {actual}")]
    DownloadIncomplete {
        url: String,
        expected: u64,
        actual: u64,
    },

    #[error("Archive error: {message}")]
    ArchiveError { message: String },

    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("Smoke check against {url} failed: {reason}")]
    SmokeCheckFailed { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    FileSystem,
    ExternalCommand,
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MoittError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingEnvError { name: name.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::DownloadIncomplete { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::ArchiveError { .. } => ErrorCategory::FileSystem,
            Self::SerializationError(_)
            | Self::YamlError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::MissingEnvError { .. } => ErrorCategory::Configuration,
            Self::ToolNotFound { .. } | Self::CommandFailed { .. } => {
                ErrorCategory::ExternalCommand
            }
            Self::Timeout { .. } | Self::SmokeCheckFailed { .. } => ErrorCategory::Cluster,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路與等待類錯誤通常重跑即可
            Self::ApiError(_) | Self::DownloadIncomplete { .. } | Self::Timeout { .. } => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) | Self::ToolNotFound { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingEnvError { name } => format!("{} is not set", name),
            Self::ToolNotFound { tool, .. } => format!("'{}' could not be run", tool),
            Self::CommandFailed { command, .. } => format!("Step failed: {}", command),
            Self::DownloadIncomplete { url, .. } => format!("Download interrupted: {}", url),
            Self::Timeout { what, .. } => format!("Cluster did not become ready: {}", what),
            Self::SmokeCheckFailed { url, .. } => format!("Sample application unreachable: {}", url),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingEnvError { name } => match name.as_str() {
                "AWS_PROFILE" => "Export AWS_PROFILE with a profile configured in ~/.aws/credentials".to_string(),
                "PULL_SEC" => "Export PULL_SEC with the path to your pull secret file".to_string(),
                other => format!("Export {} and run again", other),
            },
            Self::ToolNotFound { hint, .. } => hint.clone(),
            Self::CommandFailed { .. } => {
                "Inspect the command output above; rerun with --verbose for details".to_string()
            }
            Self::DownloadIncomplete { .. } | Self::ApiError(_) => {
                "Check network access to the mirror and run again".to_string()
            }
            Self::Timeout { .. } => {
                "Inspect pods with `oc get pods` or raise check_timeout_seconds in moitt.toml"
                    .to_string()
            }
            Self::SmokeCheckFailed { .. } => {
                "Check the istio-ingressgateway route and the bookinfo pods".to_string()
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Check the command-line flags and moitt.toml".to_string()
            }
            _ => "Run again with --verbose for more details".to_string(),
        }
    }

    /// 對應 CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, MoittError>;
