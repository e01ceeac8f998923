mod common;

use common::{build_tar_gz, env_of, fast_settings, write_kubeadmin_password, RecordingRunner};
use httpmock::prelude::*;
use moitt::core::{CommandOutput, Component, Operation};
use moitt::{MoittError, Orchestrator, RunOptions};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn options(component: Option<Component>, operation: Operation, assets: &Path) -> RunOptions {
    RunOptions {
        component,
        operation,
        assets: assets.to_path_buf(),
        version: "4.3.9".to_string(),
        quay: false,
        release: "stable".to_string(),
    }
}

#[tokio::test]
async fn test_missing_aws_profile_fails_before_any_command() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::new());

    let result = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("PULL_SEC", "/tmp/pull-secret")]),
        options(Some(Component::Ocp), Operation::Install, &dir.path().join("assets")),
    );

    match result {
        Err(MoittError::MissingEnvError { name }) => assert_eq!(name, "AWS_PROFILE"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("expected a missing AWS_PROFILE error"),
    }
    assert!(runner.lines().is_empty());
}

#[tokio::test]
async fn test_missing_pull_secret_fails_before_any_command() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::new());

    let result = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("AWS_PROFILE", "qe")]),
        options(Some(Component::Istio), Operation::Uninstall, &dir.path().join("assets")),
    );

    assert!(matches!(result, Err(MoittError::MissingEnvError { ref name }) if name == "PULL_SEC"));
    assert!(runner.lines().is_empty());
}

#[tokio::test]
async fn test_no_component_runs_nothing() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());

    let orchestrator = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("AWS_PROFILE", "qe"), ("PULL_SEC", "/tmp/pull-secret")]),
        options(None, Operation::Install, &dir.path().join("assets")),
    )?;
    let report = orchestrator.run().await?;

    assert!(!report.performed);
    assert!(runner.lines().is_empty());
    let kubeconfig = dir.path().join("assets").join("auth").join("kubeconfig");
    assert_eq!(
        orchestrator.shell().exported("KUBECONFIG"),
        Some(kubeconfig.to_string_lossy().to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_registry_puller_install() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let assets = dir.path().join("assets");
    write_kubeadmin_password(&assets);
    let secret = dir.path().join("pull-secret.yaml");
    std::fs::write(&secret, "auths: {}\n")?;

    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("AWS_PROFILE", "qe"), ("PULL_SEC", secret.to_str().unwrap())]),
        options(Some(Component::RegistryPuller), Operation::Install, &assets),
    )?;
    let report = orchestrator.run().await?;

    assert_eq!(report.component, Some(Component::RegistryPuller));
    let lines = runner.lines();
    assert_eq!(lines.first().map(String::as_str), Some("oc login -u kubeadmin -p ***"));
    assert_eq!(lines[1], "oc new-project registry-puller");
    assert!(lines.contains(
        &"oc rollout status deployment/registry-puller -n registry-puller --timeout=1s".to_string()
    ));
    assert_eq!(lines.last().map(String::as_str), Some("oc logout"));

    let calls = runner.calls();
    assert_eq!(calls[0].args.last().map(String::as_str), Some("Kube-Admin-Pw"));
    let kubeconfig = assets.join("auth").join("kubeconfig");
    assert!(calls[0]
        .env
        .contains(&("KUBECONFIG".to_string(), kubeconfig.to_string_lossy().to_string())));
    Ok(())
}

#[tokio::test]
async fn test_registry_puller_uninstall_with_bot_login() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());

    let orchestrator = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[
            ("AWS_PROFILE", "qe"),
            ("PULL_SEC", "/tmp/pull-secret"),
            ("CLUSTER_ADMIN", "bot"),
            ("ADMIN_PASS", "botpw"),
            ("CLUSTER_SERVER", "https://api.example.com:6443"),
        ]),
        options(
            Some(Component::RegistryPuller),
            Operation::Uninstall,
            &dir.path().join("assets"),
        ),
    )?;
    orchestrator.run().await?;

    assert_eq!(
        runner.lines(),
        vec![
            "oc login -u bot -p *** --server=https://api.example.com:6443 --insecure-skip-tls-verify=true",
            "oc delete -n registry-puller -f testdata/registry-puller.yaml --ignore-not-found",
            "oc delete project registry-puller --ignore-not-found",
            "oc logout",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_step_still_logs_out() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let assets = dir.path().join("assets");
    write_kubeadmin_password(&assets);
    let secret = dir.path().join("pull-secret.yaml");
    std::fs::write(&secret, "auths: {}\n")?;

    let runner = Arc::new(RecordingRunner::new());
    runner.respond("rollout status", CommandOutput::failure(1, "deadline exceeded"));
    let orchestrator = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("AWS_PROFILE", "qe"), ("PULL_SEC", secret.to_str().unwrap())]),
        options(Some(Component::RegistryPuller), Operation::Install, &assets),
    )?;

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, MoittError::CommandFailed { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(runner.lines().last().map(String::as_str), Some("oc logout"));
    Ok(())
}

#[tokio::test]
async fn test_kubeadmin_login_without_password_or_bot_fails() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());

    let orchestrator = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("AWS_PROFILE", "qe"), ("PULL_SEC", "/tmp/pull-secret")]),
        options(
            Some(Component::RegistryPuller),
            Operation::Uninstall,
            &dir.path().join("assets"),
        ),
    )?;

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, MoittError::IoError(_)));
    assert!(runner.lines().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_ocp_install_logs_in_creates_users_and_logs_out() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let assets = dir.path().join("assets");
    write_kubeadmin_password(&assets);

    let server = MockServer::start();
    let installer_tarball = build_tar_gz(&[("openshift-install", &b"installer"[..])])?;
    let client_tarball = build_tar_gz(&[("oc", &b"oc"[..]), ("kubectl", &b"kubectl"[..])])?;
    let installer = server.mock(|when, then| {
        when.method(GET).path("/4.3.9/openshift-install-linux-4.3.9.tar.gz");
        then.status(200).body(installer_tarball);
    });
    let client = server.mock(|when, then| {
        when.method(GET).path("/4.3.9/openshift-client-linux-4.3.9.tar.gz");
        then.status(200).body(client_tarball);
    });

    let mut settings = fast_settings(dir.path());
    settings.mirror.base_url = server.base_url();
    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = Orchestrator::new(
        runner.clone(),
        settings,
        env_of(&[("AWS_PROFILE", "qe"), ("PULL_SEC", "/tmp/pull-secret")]),
        options(Some(Component::Ocp), Operation::Install, &assets),
    )?;
    let report = orchestrator.run().await?;

    installer.assert();
    client.assert();
    assert!(report.performed);
    let installer_bin = dir.path().join("openshift-install");
    assert_eq!(
        runner.lines(),
        vec![
            "aws --version".to_string(),
            format!(
                "{} --dir={} create cluster",
                installer_bin.display(),
                assets.display()
            ),
            "kubectl cluster-info".to_string(),
            "oc login -u kubeadmin -p ***".to_string(),
            "scripts/user-creation.sh".to_string(),
            "oc logout".to_string(),
        ]
    );
    assert!(dir.path().join("bin/oc").is_file());
    assert!(dir.path().join("bin/kubectl").is_file());

    let calls = runner.calls();
    assert_eq!(calls[3].args.last().map(String::as_str), Some("Kube-Admin-Pw"));
    Ok(())
}

#[tokio::test]
async fn test_ocp_install_without_aws_cli_skips_login() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    runner.respond("aws --version", CommandOutput::failure(127, "aws: not found"));

    let orchestrator = Orchestrator::new(
        runner.clone(),
        fast_settings(dir.path()),
        env_of(&[("AWS_PROFILE", "qe"), ("PULL_SEC", "/tmp/pull-secret")]),
        options(Some(Component::Ocp), Operation::Install, &dir.path().join("assets")),
    )?;

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, MoittError::ToolNotFound { .. }));
    assert_eq!(runner.lines(), vec!["aws --version"]);
    Ok(())
}
