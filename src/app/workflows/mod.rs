mod istio;
mod ocp;
mod puller;

pub use istio::IstioWorkflow;
pub use ocp::OcpWorkflow;
pub use puller::PullerWorkflow;

use crate::core::ocp::OcpCluster;
use crate::utils::error::Result;
use std::future::Future;

/// Runs `steps` after a successful login and always logs out afterwards.
pub(crate) async fn logged_in<L, S>(cluster: &OcpCluster, login: L, steps: S) -> Result<()>
where
    L: Future<Output = Result<()>>,
    S: Future<Output = Result<()>>,
{
    login.await?;
    let result = steps.await;
    cluster.logout().await;
    result
}
