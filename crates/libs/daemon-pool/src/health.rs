use crate::events::PoolEvent;
use crate::pool::DaemonPool;
use crate::result::InstanceResult;

/// Outcome of one health probe across the pool.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthReport {
    pub online: bool,
    pub results: Vec<InstanceResult>,
}

impl HealthReport {
    pub fn failing(&self) -> impl Iterator<Item = &InstanceResult> {
        self.results.iter().filter(|result| !result.is_ok())
    }
}

impl DaemonPool {
    /// Sends the probe command to every instance and reports whether all answered.
    ///
    /// Emits [`PoolEvent::ConnectionFailed`] with every probe result when any
    /// instance errored, or when an instance produced no result at all
    /// because its failure is configured as log-only.
    pub async fn probe(&self) -> HealthReport {
        let method = self.options.probe_method.clone();
        let results = self.collect(&method, &[], false).await;
        let online =
            results.len() == self.instances().len() && results.iter().all(InstanceResult::is_ok);
        if !online {
            log::warn!(
                "health probe: {} of {} instances failed",
                self.instances().len() - results.iter().filter(|result| result.is_ok()).count(),
                self.instances().len()
            );
            self.emit(PoolEvent::ConnectionFailed(results.clone()));
        }
        HealthReport { online, results }
    }

    pub async fn is_online(&self) -> bool {
        self.probe().await.online
    }

    /// Probes once and emits [`PoolEvent::Online`] when every instance is up.
    /// Does not retry or poll.
    pub async fn init(&self) -> bool {
        let online = self.is_online().await;
        if online {
            log::info!("all {} daemon instances online", self.instances().len());
            self.emit(PoolEvent::Online);
        }
        online
    }
}
