#![allow(dead_code)]

use moitt::config::settings::Settings;
use moitt::EnvConfig;
use std::collections::HashMap;
use std::path::Path;

pub use moitt::testing::{build_tar_gz, RecordingRunner};

pub fn env_of(pairs: &[(&str, &str)]) -> EnvConfig {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvConfig::from_lookup(|name| map.get(name).cloned())
}

/// Settings with short readiness timeouts and files under `work_dir`.
pub fn fast_settings(work_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.work_dir = work_dir.to_path_buf();
    settings.paths.bin_dir = Some(work_dir.join("bin"));
    settings.istio.check_timeout_seconds = 1;
    settings.istio.poll_interval_seconds = 1;
    settings
}

/// Creates `<assets>/auth/kubeadmin-password` the way the installer leaves it.
pub fn write_kubeadmin_password(assets: &Path) {
    let auth = assets.join("auth");
    std::fs::create_dir_all(&auth).unwrap();
    std::fs::write(auth.join("kubeadmin-password"), "Kube-Admin-Pw\n").unwrap();
}

pub const OPERATOR_PODS: &str = r#"{"items":[
    {"metadata":{"name":"istio-operator-6d7f"},"status":{"phase":"Running"}},
    {"metadata":{"name":"jaeger-operator-5b9c"},"status":{"phase":"Running"}},
    {"metadata":{"name":"kiali-operator-7c4d"},"status":{"phase":"Running"}}
]}"#;

pub const CONTROL_PLANE_PODS: &str = r#"{"items":[
    {"metadata":{"name":"istiod-basic-install-1"},"status":{"phase":"Running"}},
    {"metadata":{"name":"grafana-1"},"status":{"phase":"Running"}}
]}"#;

pub const SAMPLE_PODS: &str = r#"{"items":[
    {"metadata":{"name":"productpage-v1-7f8c"},"status":{"phase":"Running"}},
    {"metadata":{"name":"reviews-v1-5d6b"},"status":{"phase":"Running"}}
]}"#;
