use crate::config::settings::{IstioSettings, QuaySettings};
use crate::core::istio::manifests::{
    OperatorSource, Subscription, MARKETPLACE_NAMESPACE, QUAY_OPERATOR_SOURCE, QUAY_TOKEN_SECRET,
    REDHAT_OPERATORS,
};
use crate::core::kube::{InstallPlanList, PodList};
use crate::core::shell::Shell;
use crate::core::wait::wait_until;
use crate::domain::model::{CommandSpec, Credentials};
use crate::utils::error::{MoittError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const JAEGER_PACKAGE: &str = "jaeger-product";
const KIALI_PACKAGE: &str = "kiali-ossm";
const ISTIO_PACKAGE: &str = "servicemeshoperator";
const OPERATOR_PODS: [&str; 3] = ["istio-operator", "jaeger-operator", "kiali-operator"];

#[derive(Debug, Deserialize)]
struct QuayLoginResponse {
    token: Option<String>,
}

/// Installs the Maistra operator and its jaeger/kiali dependencies through OLM.
pub struct Operator {
    shell: Arc<Shell>,
    http: Client,
    maistra_branch: String,
    release: String,
    quay: bool,
    istio: IstioSettings,
    quay_settings: QuaySettings,
}

impl Operator {
    pub fn new(
        shell: Arc<Shell>,
        http: Client,
        release: &str,
        quay: bool,
        istio: IstioSettings,
        quay_settings: QuaySettings,
    ) -> Self {
        Self {
            shell,
            http,
            maistra_branch: format!("maistra-{}", release),
            release: release.to_string(),
            quay,
            istio,
            quay_settings,
        }
    }

    pub fn maistra_branch(&self) -> &str {
        &self.maistra_branch
    }

    fn namespace(&self) -> &str {
        &self.istio.operator_namespace
    }

    fn source(&self) -> &str {
        if self.quay {
            QUAY_OPERATOR_SOURCE
        } else {
            REDHAT_OPERATORS
        }
    }

    pub fn jaeger_subscription(&self) -> Subscription {
        Subscription::new(JAEGER_PACKAGE, self.namespace(), "stable", REDHAT_OPERATORS)
    }

    pub fn kiali_subscription(&self) -> Subscription {
        Subscription::new(KIALI_PACKAGE, self.namespace(), "stable", REDHAT_OPERATORS)
    }

    pub fn istio_subscription(&self) -> Subscription {
        Subscription::new(ISTIO_PACKAGE, self.namespace(), &self.release, self.source())
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        vec![
            self.istio_subscription(),
            self.kiali_subscription(),
            self.jaeger_subscription(),
        ]
    }

    /// Logs in to quay.io and stores the returned token as the `quay-token` secret.
    pub async fn update_quay_token(&self, credentials: &Credentials) -> Result<()> {
        tracing::info!("🔑 Requesting quay.io token for {}", credentials.username);
        let body = json!({
            "user": {
                "username": credentials.username,
                "password": credentials.password,
            }
        });
        let response: QuayLoginResponse = self
            .http
            .post(&self.quay_settings.login_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let token = response
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| MoittError::config("quay login response has no token"))?;

        self.shell
            .oc([
                "delete",
                "secret",
                QUAY_TOKEN_SECRET,
                "-n",
                MARKETPLACE_NAMESPACE,
                "--ignore-not-found",
            ])
            .await?;
        let literal = format!("--from-literal=token={}", token);
        self.shell
            .oc([
                "create",
                "secret",
                "generic",
                QUAY_TOKEN_SECRET,
                "-n",
                MARKETPLACE_NAMESPACE,
                literal.as_str(),
            ])
            .await?;
        Ok(())
    }

    pub async fn apply_operator_source(&self) -> Result<()> {
        tracing::info!("📚 Applying operator source for {}", self.maistra_branch);
        let manifest =
            OperatorSource::quay(&self.quay_settings.registry_namespace, &self.maistra_branch)
                .to_yaml()?;
        self.shell
            .apply_manifest(MARKETPLACE_NAMESPACE, &manifest)
            .await?;
        Ok(())
    }

    async fn deploy(&self, subscription: Subscription) -> Result<()> {
        tracing::info!(
            "📦 Subscribing to {} ({} / {})",
            subscription.name(),
            subscription.spec.source,
            subscription.spec.channel
        );
        self.shell
            .apply_manifest(self.namespace(), &subscription.to_yaml()?)
            .await?;
        Ok(())
    }

    pub async fn deploy_jaeger(&self) -> Result<()> {
        self.deploy(self.jaeger_subscription()).await
    }

    pub async fn deploy_kiali(&self) -> Result<()> {
        self.deploy(self.kiali_subscription()).await
    }

    pub async fn deploy_istio(&self) -> Result<()> {
        self.deploy(self.istio_subscription()).await
    }

    /// Approves pending InstallPlans so the CSVs get installed on OCP 4.1.
    pub async fn approve_install_plans(&self) -> Result<usize> {
        let value = self
            .shell
            .oc_json(["get", "installplan", "-n", self.namespace()])
            .await?;
        let plans = InstallPlanList::from_value(value)?;

        let mut approved = 0;
        for name in plans.unapproved() {
            self.shell
                .oc([
                    "patch",
                    "installplan",
                    name,
                    "-n",
                    self.namespace(),
                    "--type",
                    "merge",
                    "-p",
                    r#"{"spec":{"approved":true}}"#,
                ])
                .await?;
            approved += 1;
        }
        tracing::info!("Approved {} install plan(s)", approved);
        Ok(approved)
    }

    pub async fn check(&self) -> Result<()> {
        tracing::info!("🔍 Waiting for operator pods in {}", self.namespace());
        let shell = &self.shell;
        let namespace = self.namespace();
        wait_until(
            "operator pods",
            self.istio.check_timeout(),
            self.istio.poll_interval(),
            move || async move {
                let value = shell.oc_json(["get", "pods", "-n", namespace]).await?;
                Ok::<_, MoittError>(PodList::from_value(value)?.has_running(&OPERATOR_PODS))
            },
        )
        .await
    }

    /// Deletes each subscription and the CSV it installed.
    pub async fn uninstall(&self) -> Result<()> {
        for subscription in self.subscriptions() {
            let name = subscription.name();
            let csv = self
                .shell
                .run(
                    CommandSpec::new(
                        "oc",
                        [
                            "get",
                            "subscription",
                            name,
                            "-n",
                            self.namespace(),
                            "-o",
                            "jsonpath={.status.installedCSV}",
                        ],
                    )
                    .unchecked()
                    .quiet(),
                )
                .await?;

            tracing::info!("🧹 Removing subscription {}", name);
            self.shell
                .oc([
                    "delete",
                    "subscription",
                    name,
                    "-n",
                    self.namespace(),
                    "--ignore-not-found",
                ])
                .await?;

            let csv_name = csv.stdout.trim();
            if csv.is_success() && !csv_name.is_empty() {
                self.shell
                    .oc([
                        "delete",
                        "csv",
                        csv_name,
                        "-n",
                        self.namespace(),
                        "--ignore-not-found",
                    ])
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn uninstall_operator_source(&self) -> Result<()> {
        self.shell
            .oc([
                "delete",
                "operatorsource",
                QUAY_OPERATOR_SOURCE,
                "-n",
                MARKETPLACE_NAMESPACE,
                "--ignore-not-found",
            ])
            .await?;
        self.shell
            .oc([
                "delete",
                "secret",
                QUAY_TOKEN_SECRET,
                "-n",
                MARKETPLACE_NAMESPACE,
                "--ignore-not-found",
            ])
            .await?;
        Ok(())
    }
}
