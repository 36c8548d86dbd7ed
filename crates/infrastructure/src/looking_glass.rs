use crate::dns::TransportQueryExecutor;
use crate::wire::{decode_request, encode_error, encode_response};
use looking_glass_application::ports::QueryExecutor;
use looking_glass_application::use_cases::ExecuteQueriesUseCase;
use looking_glass_domain::DomainError;
use std::sync::Arc;
use tracing::warn;

/// Turns one request document into one response document.
pub struct LookingGlass {
    use_case: ExecuteQueriesUseCase,
}

impl LookingGlass {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            use_case: ExecuteQueriesUseCase::new(executor),
        }
    }

    /// Service backed by the raw-socket transport engine.
    pub fn with_transport() -> Self {
        Self::new(Arc::new(TransportQueryExecutor::new()))
    }

    /// Always produces a document: either the per-query responses or a
    /// batch error.
    pub async fn run(&self, json: &str) -> String {
        match self.try_run(json).await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Request batch rejected");
                encode_error(&e)
            }
        }
    }

    async fn try_run(&self, json: &str) -> Result<String, DomainError> {
        let queries = decode_request(json).await?;
        let results = self.use_case.execute(queries).await?;
        encode_response(&results)
    }
}

impl Default for LookingGlass {
    fn default() -> Self {
        Self::with_transport()
    }
}
