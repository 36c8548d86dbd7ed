use async_trait::async_trait;
use looking_glass_domain::{DomainError, QueryDescriptor, QueryResult};

/// Runs one batch of raw DNS exchanges against the live network.
///
/// Implementations return exactly one result per descriptor, in input
/// order. `Err` is reserved for failures that are not attributable to a
/// single query's network conditions.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, queries: Vec<QueryDescriptor>) -> Result<Vec<QueryResult>, DomainError>;
}
