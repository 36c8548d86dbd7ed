use crate::ports::QueryExecutor;
use looking_glass_domain::{DomainError, QueryDescriptor, QueryResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct ExecuteQueriesUseCase {
    executor: Arc<dyn QueryExecutor>,
}

impl ExecuteQueriesUseCase {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    pub async fn execute(
        &self,
        queries: Vec<QueryDescriptor>,
    ) -> Result<Vec<QueryResult>, DomainError> {
        if queries.is_empty() {
            debug!("Empty batch, nothing to execute");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let expected = queries.len();
        let results = self.executor.execute(queries).await?;

        if results.len() != expected {
            return Err(DomainError::ResultCountMismatch {
                expected,
                actual: results.len(),
            });
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(
            queries = expected,
            succeeded,
            failed = expected - succeeded,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch executed"
        );

        Ok(results)
    }
}
