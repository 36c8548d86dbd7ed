use super::{QueryHandler, TransportError};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::time::timeout_at;
use tracing::{debug, warn};

/// Runs a batch of queries concurrently on the current task.
///
/// Every handler is prepared up front, then all of them are multiplexed
/// until each one has completed, failed or passed its own deadline.
pub struct TransportManager;

impl TransportManager {
    pub fn new() -> Self {
        Self
    }

    /// Returns once every handler is terminal. A single unclassified failure
    /// does not stop the rest of the batch; the first one seen is returned
    /// after the others have finished.
    pub async fn query(&self, handlers: &mut [QueryHandler]) -> Result<(), TransportError> {
        let mut first_failure: Option<TransportError> = None;

        for handler in handlers.iter_mut() {
            if let Err(e) = handler.prepare() {
                first_failure.get_or_insert(e);
            }
        }

        let mut pending: FuturesUnordered<_> = handlers
            .iter_mut()
            .filter(|handler| !handler.is_terminal())
            .map(run_to_completion)
            .collect();

        debug!(
            queries = pending.len(),
            "Waiting for in-flight queries"
        );

        while let Some(outcome) = pending.next().await {
            if let Err(e) = outcome {
                warn!(destination = %e.destination(), error = %e, "Query aborted");
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for TransportManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_to_completion(handler: &mut QueryHandler) -> Result<(), TransportError> {
    let Some(deadline) = handler.expiration() else {
        return handler.drive().await;
    };

    match timeout_at(deadline, handler.drive()).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => {
            handler.timeout();
            Ok(())
        }
    }
}
