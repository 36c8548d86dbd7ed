mod execute_queries;

pub use execute_queries::ExecuteQueriesUseCase;
