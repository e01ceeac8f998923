use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{MoittError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared command session.
///
/// Variables passed to [`Shell::export`] are added to every later child
/// process, the way an interactive shell carries `KUBECONFIG` and
/// `AWS_PROFILE` between commands. The process environment itself is never
/// touched.
pub struct Shell {
    runner: Arc<dyn CommandRunner>,
    exported: Mutex<BTreeMap<String, String>>,
}

impl Shell {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            exported: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn export(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        tracing::debug!("export {}={}", key, value);
        self.locked().insert(key, value);
    }

    pub fn exported(&self, key: &str) -> Option<String> {
        self.locked().get(key).cloned()
    }

    // A panic while holding the lock cannot leave the map half-written.
    fn locked(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.exported.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn run(&self, mut spec: CommandSpec) -> Result<CommandOutput> {
        let exported: Vec<(String, String)> = self
            .locked()
            .iter()
            .filter(|(key, _)| !spec.env.iter().any(|(k, _)| k == *key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let own = std::mem::take(&mut spec.env);
        spec.env = exported.into_iter().chain(own).collect();

        self.runner.run(&spec).await
    }

    pub async fn oc<I, S>(&self, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(CommandSpec::new("oc", args)).await
    }

    /// `oc ... -o json` parsed into a JSON value.
    pub async fn oc_json<I, S>(&self, args: I) -> Result<serde_json::Value>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = CommandSpec::new("oc", args).quiet();
        spec.args.extend(["-o".to_string(), "json".to_string()]);
        let output = self.run(spec).await?;
        Ok(serde_json::from_str(&output.stdout)?)
    }

    pub async fn apply_file(&self, namespace: &str, file: &Path) -> Result<CommandOutput> {
        let file = file.to_string_lossy().to_string();
        self.oc(["apply", "-n", namespace, "-f", file.as_str()]).await
    }

    pub async fn apply_manifest(&self, namespace: &str, manifest: &str) -> Result<CommandOutput> {
        self.run(CommandSpec::new("oc", ["apply", "-n", namespace, "-f", "-"]).stdin(manifest))
            .await
    }

    pub async fn delete_file(&self, namespace: &str, file: &Path) -> Result<CommandOutput> {
        let file = file.to_string_lossy().to_string();
        self.oc([
            "delete",
            "-n",
            namespace,
            "-f",
            file.as_str(),
            "--ignore-not-found",
        ])
        .await
    }

    /// `oc new-project`, tolerating a project that already exists.
    pub async fn ensure_project(&self, name: &str) -> Result<()> {
        let spec = CommandSpec::new("oc", ["new-project", name]).unchecked();
        let output = self.run(spec.clone()).await?;
        if output.is_success() || output.stderr.contains("already exists") {
            return Ok(());
        }
        Err(MoittError::CommandFailed {
            command: spec.display(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }

    pub async fn delete_project(&self, name: &str) -> Result<CommandOutput> {
        self.oc(["delete", "project", name, "--ignore-not-found"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[tokio::test]
    async fn test_exported_env_is_added_to_commands() {
        let runner = Arc::new(RecordingRunner::new());
        let shell = Shell::new(runner.clone());
        shell.export("KUBECONFIG", "assets/auth/kubeconfig");
        shell.export("AWS_PROFILE", "qe");

        shell
            .run(CommandSpec::new("oc", ["whoami"]).env("AWS_PROFILE", "override"))
            .await
            .unwrap();

        let calls = runner.calls();
        let env = &calls[0].env;
        assert!(env.contains(&("KUBECONFIG".to_string(), "assets/auth/kubeconfig".to_string())));
        assert!(env.contains(&("AWS_PROFILE".to_string(), "override".to_string())));
        assert_eq!(env.len(), 2);
    }

    #[tokio::test]
    async fn test_ensure_project_tolerates_existing() {
        let runner = Arc::new(RecordingRunner::new());
        runner.respond(
            "new-project foo",
            CommandOutput::failure(1, "Error from server (AlreadyExists): project.project.openshift.io \"foo\" already exists"),
        );
        runner.respond("new-project bad", CommandOutput::failure(1, "forbidden"));
        let shell = Shell::new(runner.clone());

        assert!(shell.ensure_project("foo").await.is_ok());
        let err = shell.ensure_project("bad").await.unwrap_err();
        assert!(matches!(err, MoittError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn test_oc_json_parses_output() {
        let runner = Arc::new(RecordingRunner::new());
        runner.respond(
            "oc get pods",
            CommandOutput::success(r#"{"items": []}"#),
        );
        let shell = Shell::new(runner.clone());

        let value = shell.oc_json(["get", "pods", "-n", "istio-system"]).await.unwrap();
        assert!(value["items"].as_array().unwrap().is_empty());
        assert_eq!(runner.lines(), vec!["oc get pods -n istio-system -o json"]);
        assert!(runner.calls()[0].quiet);
    }

    #[tokio::test]
    async fn test_apply_manifest_uses_stdin() {
        let runner = Arc::new(RecordingRunner::new());
        let shell = Shell::new(runner.clone());

        shell
            .apply_manifest("openshift-operators", "kind: Subscription\n")
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].display(), "oc apply -n openshift-operators -f -");
        assert_eq!(calls[0].stdin.as_deref(), Some("kind: Subscription\n"));
    }

    #[tokio::test]
    async fn test_export_survives_poisoned_lock() {
        let runner = Arc::new(RecordingRunner::new());
        let shell = Arc::new(Shell::new(runner.clone()));
        shell.export("AWS_PROFILE", "qe");

        let poisoner = shell.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.exported.lock().unwrap();
            panic!("poison the export map");
        })
        .join();
        assert!(joined.is_err());
        assert!(shell.exported.is_poisoned());

        shell.export("KUBECONFIG", "/tmp/auth/kubeconfig");
        assert_eq!(shell.exported("AWS_PROFILE").as_deref(), Some("qe"));
        assert_eq!(
            shell.exported("KUBECONFIG").as_deref(),
            Some("/tmp/auth/kubeconfig")
        );

        shell.oc(["whoami"]).await.unwrap();
        assert_eq!(runner.calls()[0].env.len(), 2);
    }
}
