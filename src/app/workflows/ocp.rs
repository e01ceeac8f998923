use super::logged_in;
use crate::core::ocp::OcpCluster;
use crate::core::{Component, Workflow};
use crate::domain::model::BotCredentials;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub struct OcpWorkflow {
    cluster: Arc<OcpCluster>,
    bot: Option<BotCredentials>,
}

impl OcpWorkflow {
    pub fn new(cluster: Arc<OcpCluster>, bot: Option<BotCredentials>) -> Self {
        Self { cluster, bot }
    }
}

#[async_trait]
impl Workflow for OcpWorkflow {
    fn component(&self) -> Component {
        Component::Ocp
    }

    async fn install(&self) -> Result<()> {
        self.cluster.install().await?;
        logged_in(
            &self.cluster,
            self.cluster.login_kubeadmin(self.bot.as_ref()),
            self.cluster.create_users(),
        )
        .await
    }

    async fn uninstall(&self) -> Result<()> {
        self.cluster.uninstall().await
    }
}
