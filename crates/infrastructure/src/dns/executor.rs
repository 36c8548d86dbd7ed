use super::transport::{QueryHandler, TransportManager};
use async_trait::async_trait;
use looking_glass_application::ports::QueryExecutor;
use looking_glass_domain::{DomainError, QueryDescriptor, QueryResult};
use tracing::{debug, error};

/// Executes query batches on the raw-socket transport engine.
pub struct TransportQueryExecutor {
    manager: TransportManager,
}

impl TransportQueryExecutor {
    pub fn new() -> Self {
        Self {
            manager: TransportManager::new(),
        }
    }
}

impl Default for TransportQueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for TransportQueryExecutor {
    async fn execute(&self, queries: Vec<QueryDescriptor>) -> Result<Vec<QueryResult>, DomainError> {
        let mut handlers: Vec<QueryHandler> = queries.iter().map(QueryHandler::new).collect();

        debug!(queries = handlers.len(), "Dispatching query batch");

        if let Err(e) = self.manager.query(&mut handlers).await {
            error!(error = %e, "Query batch aborted");
            return Err(DomainError::TransportFailure(e.to_string()));
        }

        handlers
            .iter_mut()
            .map(|handler| {
                handler.finalize();
                handler.result().ok_or_else(|| {
                    DomainError::TransportFailure(format!(
                        "query to {} ended without an outcome ({:?})",
                        handler.destination(),
                        handler.state()
                    ))
                })
            })
            .collect()
    }
}
