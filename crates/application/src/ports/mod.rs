mod query_executor;

pub use query_executor::QueryExecutor;

// Re-export for convenience
pub use looking_glass_domain::{QueryDescriptor, QueryResult};
