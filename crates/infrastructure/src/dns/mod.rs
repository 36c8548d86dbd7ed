pub mod executor;
pub mod transport;

pub use executor::TransportQueryExecutor;
pub use transport::{QueryHandler, QueryState, TransportError, TransportManager};
