use super::logged_in;
use crate::core::ocp::OcpCluster;
use crate::core::puller::RegistryPuller;
use crate::core::{Component, Workflow};
use crate::domain::model::BotCredentials;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub struct PullerWorkflow {
    cluster: Arc<OcpCluster>,
    bot: Option<BotCredentials>,
    puller: RegistryPuller,
}

impl PullerWorkflow {
    pub fn new(cluster: Arc<OcpCluster>, bot: Option<BotCredentials>, puller: RegistryPuller) -> Self {
        Self {
            cluster,
            bot,
            puller,
        }
    }
}

#[async_trait]
impl Workflow for PullerWorkflow {
    fn component(&self) -> Component {
        Component::RegistryPuller
    }

    async fn install(&self) -> Result<()> {
        logged_in(
            &self.cluster,
            self.cluster.login_kubeadmin(self.bot.as_ref()),
            async {
                self.puller.build().await?;
                self.puller.execute().await
            },
        )
        .await
    }

    async fn uninstall(&self) -> Result<()> {
        logged_in(
            &self.cluster,
            self.cluster.login_kubeadmin(self.bot.as_ref()),
            self.puller.remove(),
        )
        .await
    }
}
