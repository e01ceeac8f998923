use super::logged_in;
use crate::core::istio::{ControlPlane, Operator};
use crate::core::ocp::OcpCluster;
use crate::core::{Component, Workflow};
use crate::domain::model::{BotCredentials, Credentials};
use crate::utils::error::{MoittError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Operators are handled as kubeadmin, the control plane as the qe1 user.
pub struct IstioWorkflow {
    cluster: Arc<OcpCluster>,
    bot: Option<BotCredentials>,
    operator: Operator,
    control_plane: ControlPlane,
    qe1: Credentials,
    quay: bool,
    quay_credentials: Option<Credentials>,
    cr_file: Option<String>,
    member_namespaces: Vec<String>,
}

impl IstioWorkflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cluster: Arc<OcpCluster>,
        bot: Option<BotCredentials>,
        operator: Operator,
        control_plane: ControlPlane,
        qe1: Credentials,
        quay: bool,
        quay_credentials: Option<Credentials>,
        cr_file: Option<String>,
        member_namespaces: Vec<String>,
    ) -> Self {
        Self {
            cluster,
            bot,
            operator,
            control_plane,
            qe1,
            quay,
            quay_credentials,
            cr_file,
            member_namespaces,
        }
    }

    async fn install_operators(&self) -> Result<()> {
        if self.quay {
            let credentials = self
                .quay_credentials
                .as_ref()
                .ok_or_else(|| MoittError::missing_env("QUAY_USER"))?;
            self.operator.update_quay_token(credentials).await?;
            self.operator.apply_operator_source().await?;
        }
        self.operator.deploy_jaeger().await?;
        self.operator.deploy_kiali().await?;
        self.operator.deploy_istio().await?;
        self.operator.approve_install_plans().await?;
        self.operator.check().await
    }

    async fn install_control_plane(&self) -> Result<()> {
        self.control_plane.install(self.cr_file.as_deref()).await?;
        self.control_plane.create_ns(&self.member_namespaces).await?;
        self.control_plane.apply_smmr().await?;
        self.control_plane.smoke_check().await?;
        self.control_plane.check().await
    }

    async fn uninstall_operators(&self) -> Result<()> {
        self.operator.uninstall().await?;
        if self.quay {
            self.operator.uninstall_operator_source().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Workflow for IstioWorkflow {
    fn component(&self) -> Component {
        Component::Istio
    }

    async fn install(&self) -> Result<()> {
        logged_in(
            &self.cluster,
            self.cluster.login_kubeadmin(self.bot.as_ref()),
            self.install_operators(),
        )
        .await?;
        logged_in(
            &self.cluster,
            self.cluster.login(&self.qe1),
            self.install_control_plane(),
        )
        .await
    }

    async fn uninstall(&self) -> Result<()> {
        logged_in(
            &self.cluster,
            self.cluster.login(&self.qe1),
            self.control_plane.uninstall(self.cr_file.as_deref()),
        )
        .await?;
        logged_in(
            &self.cluster,
            self.cluster.login_kubeadmin(self.bot.as_ref()),
            self.uninstall_operators(),
        )
        .await
    }
}
