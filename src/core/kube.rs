use serde::Deserialize;

/// The subset of `oc get pods -o json` that readiness checks look at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodStatus {
    #[serde(default)]
    pub phase: String,
}

impl Pod {
    pub fn is_running(&self) -> bool {
        self.status.phase == "Running"
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status.phase.as_str(), "Running" | "Succeeded")
    }
}

impl PodList {
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Every prefix has at least one running pod whose name starts with it.
    pub fn has_running(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().all(|prefix| {
            self.items
                .iter()
                .any(|pod| pod.metadata.name.starts_with(prefix) && pod.is_running())
        })
    }

    /// Non-empty, and every pod is Running or Succeeded.
    pub fn all_settled(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(Pod::is_settled)
    }

    pub fn not_settled(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|pod| !pod.is_settled())
            .map(|pod| pod.metadata.name.as_str())
            .collect()
    }
}

/// The subset of `oc get installplan -o json` needed for approval.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallPlanList {
    #[serde(default)]
    pub items: Vec<InstallPlan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallPlan {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: InstallPlanSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallPlanSpec {
    #[serde(default)]
    pub approved: bool,
}

impl InstallPlanList {
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn unapproved(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|plan| !plan.spec.approved)
            .map(|plan| plan.metadata.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pods(entries: &[(&str, &str)]) -> PodList {
        let items: Vec<_> = entries
            .iter()
            .map(|(name, phase)| json!({"metadata": {"name": name}, "status": {"phase": phase}}))
            .collect();
        PodList::from_value(json!({ "items": items })).unwrap()
    }

    #[test]
    fn test_has_running_requires_every_prefix() {
        let list = pods(&[
            ("istio-operator-5d8f7b-abcde", "Running"),
            ("jaeger-operator-7c9-xyz", "Running"),
            ("kiali-operator-66-qwe", "Pending"),
        ]);
        assert!(list.has_running(&["istio-operator", "jaeger-operator"]));
        assert!(!list.has_running(&["istio-operator", "kiali-operator"]));
    }

    #[test]
    fn test_all_settled() {
        assert!(!pods(&[]).all_settled());
        assert!(pods(&[("istiod-1", "Running"), ("job-1", "Succeeded")]).all_settled());

        let list = pods(&[("istiod-1", "Running"), ("grafana-1", "ContainerCreating")]);
        assert!(!list.all_settled());
        assert_eq!(list.not_settled(), vec!["grafana-1"]);
    }

    #[test]
    fn test_unapproved_install_plans() {
        let list = InstallPlanList::from_value(json!({
            "items": [
                {"metadata": {"name": "install-abc"}, "spec": {"approved": true}},
                {"metadata": {"name": "install-def"}, "spec": {"approved": false}},
                {"metadata": {"name": "install-ghi"}, "spec": {}}
            ]
        }))
        .unwrap();
        let names: Vec<&str> = list.unapproved().collect();
        assert_eq!(names, vec!["install-def", "install-ghi"]);
    }
}
