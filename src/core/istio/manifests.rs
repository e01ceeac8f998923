//! OLM and Maistra objects rendered as YAML and piped to `oc apply -f -`.

use crate::utils::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

pub const REDHAT_OPERATORS: &str = "redhat-operators";
pub const MARKETPLACE_NAMESPACE: &str = "openshift-marketplace";
pub const QUAY_OPERATOR_SOURCE: &str = "maistra-operators";
pub const QUAY_TOKEN_SECRET: &str = "quay-token";
/// Maistra only honours a member roll with this name.
pub const MEMBER_ROLL_NAME: &str = "default";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: SubscriptionSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    pub channel: String,
    pub name: String,
    pub source: String,
    pub source_namespace: String,
    pub install_plan_approval: String,
}

impl Subscription {
    pub fn new(package: &str, namespace: &str, channel: &str, source: &str) -> Self {
        Self {
            api_version: "operators.coreos.com/v1alpha1".to_string(),
            kind: "Subscription".to_string(),
            metadata: Metadata {
                name: package.to_string(),
                namespace: namespace.to_string(),
                labels: BTreeMap::new(),
            },
            spec: SubscriptionSpec {
                channel: channel.to_string(),
                name: package.to_string(),
                source: source.to_string(),
                source_namespace: MARKETPLACE_NAMESPACE.to_string(),
                install_plan_approval: "Automatic".to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSource {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: OperatorSourceSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSourceSpec {
    #[serde(rename = "type")]
    pub source_type: String,
    pub endpoint: String,
    pub registry_namespace: String,
    pub display_name: String,
    pub publisher: String,
    pub authorization_token: AuthorizationToken,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationToken {
    pub secret_name: String,
}

impl OperatorSource {
    /// Private quay.io app registry holding the Maistra operator builds of `branch`.
    pub fn quay(registry_namespace: &str, branch: &str) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("maistra.io/branch".to_string(), branch.to_string());

        Self {
            api_version: "operators.coreos.com/v1".to_string(),
            kind: "OperatorSource".to_string(),
            metadata: Metadata {
                name: QUAY_OPERATOR_SOURCE.to_string(),
                namespace: MARKETPLACE_NAMESPACE.to_string(),
                labels,
            },
            spec: OperatorSourceSpec {
                source_type: "appregistry".to_string(),
                endpoint: "https://quay.io/cnr".to_string(),
                registry_namespace: registry_namespace.to_string(),
                display_name: format!("Maistra Operators ({})", branch),
                publisher: "Red Hat".to_string(),
                authorization_token: AuthorizationToken {
                    secret_name: QUAY_TOKEN_SECRET.to_string(),
                },
            },
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMeshMemberRoll {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: MemberRollSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberRollSpec {
    pub members: Vec<String>,
}

impl ServiceMeshMemberRoll {
    pub fn new(namespace: &str, members: &[String]) -> Self {
        Self {
            api_version: "maistra.io/v1".to_string(),
            kind: "ServiceMeshMemberRoll".to_string(),
            metadata: Metadata {
                name: MEMBER_ROLL_NAME.to_string(),
                namespace: namespace.to_string(),
                labels: BTreeMap::new(),
            },
            spec: MemberRollSpec {
                members: members.to_vec(),
            },
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
