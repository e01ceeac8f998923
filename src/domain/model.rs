use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Ocp,
    RegistryPuller,
    Istio,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Ocp => "ocp",
            Component::RegistryPuller => "registry-puller",
            Component::Istio => "istio",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Install,
    Uninstall,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Install => f.write_str("install"),
            Operation::Uninstall => f.write_str("uninstall"),
        }
    }
}

/// 使用者帳密
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// 不輸出密碼
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Service account style login against an explicit API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCredentials {
    pub credentials: Credentials,
    pub server: String,
}

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
    /// When false a non-zero exit is reported back instead of failing the step.
    pub check: bool,
    /// Keep stdout out of the info log, e.g. for `-o json` queries.
    pub quiet: bool,
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            current_dir: None,
            check: true,
            quiet: false,
            stdin: None,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Printable form with secrets after `-p` masked.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                parts.push("***".to_string());
                mask_next = false;
                continue;
            }
            if let Some(rest) = arg.strip_prefix("--from-literal=token=") {
                if !rest.is_empty() {
                    parts.push("--from-literal=token=***".to_string());
                    continue;
                }
            }
            if arg == "-p" || arg == "--password" {
                mask_next = true;
            }
            parts.push(arg.clone());
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_masks_password() {
        let spec = CommandSpec::new("oc", ["login", "-u", "kubeadmin", "-p", "s3cret"]);
        assert_eq!(spec.display(), "oc login -u kubeadmin -p ***");

        let secret = CommandSpec::new("oc", ["create", "secret", "--from-literal=token=abc"]);
        assert_eq!(secret.display(), "oc create secret --from-literal=token=***");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("qe1", "qe1pw");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("qe1"));
        assert!(!printed.contains("qe1pw"));
    }

    #[test]
    fn test_component_display() {
        assert_eq!(Component::RegistryPuller.to_string(), "registry-puller");
        assert_eq!(Operation::Uninstall.to_string(), "uninstall");
    }
}
