//! Looking Glass Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod errors;
pub mod query_error;
pub mod query_result;

pub use config::{CliOverrides, Config, ConfigError, LogFormat, LoggingConfig, ServerConfig};
pub use dns_protocol::DnsProtocol;
pub use dns_query::QueryDescriptor;
pub use errors::DomainError;
pub use query_error::{Errno, QueryError};
pub use query_result::QueryResult;
