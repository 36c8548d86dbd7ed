mod mock_executor;

pub use mock_executor::MockQueryExecutor;
