use super::{check_with_retry, JsonRpcChecker, LivenessChecker};
use crate::error::{Error, Result};
use crate::orchestrator::{RunningNetwork, RunningService};
use crate::service::ServiceId;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait for terminal services to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessPolicy {
    pub retries: usize,
    /// Delay before the second attempt; doubles per attempt
    pub interval: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            retries: 30,
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Wait until every terminal service of `network` answers its liveness probe
/// on its published primary port.
///
/// Dependencies are not probed: a terminal service can only come up once the
/// services it bootstraps from are live.
pub async fn wait_until_ready(network: &RunningNetwork, policy: &ReadinessPolicy) -> Result<()> {
    wait_until_ready_with(network, policy, |service, policy| {
        let port = service.primary_host_port().ok_or_else(|| {
            Error::Validation(format!("service {} has no published primary port", service.id))
        })?;
        Ok(Box::new(JsonRpcChecker::local(port, &service.liveness_probe, policy.timeout)))
    })
    .await
}

/// [`wait_until_ready`] with a caller-supplied checker per service.
pub async fn wait_until_ready_with<F>(
    network: &RunningNetwork,
    policy: &ReadinessPolicy,
    make_checker: F,
) -> Result<()>
where
    F: Fn(&RunningService, &ReadinessPolicy) -> Result<Box<dyn LivenessChecker>>,
{
    let mut checks = Vec::new();
    for &id in network.terminal_service_ids() {
        let service = network.get(id)?;
        let checker = make_checker(service, policy)?;
        checks.push(async move {
            let live = check_with_retry(checker.as_ref(), policy.retries, policy.interval).await;
            if live {
                tracing::info!("Service {} is live", id);
            } else {
                tracing::warn!("Service {} never passed its liveness probe", id);
            }
            (id, live)
        });
    }

    let not_ready: Vec<ServiceId> = join_all(checks)
        .await
        .into_iter()
        .filter(|(_, live)| !live)
        .map(|(id, _)| id)
        .collect();

    if not_ready.is_empty() {
        Ok(())
    } else {
        Err(Error::NotReady(not_ready))
    }
}
