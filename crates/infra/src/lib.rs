//! Infrastructure layer: storage backends, configuration, and the service
//! that runs network commands against a store.

pub mod backends;
pub mod config;
pub mod demo;
pub mod directory;
pub mod service;
pub mod store;

pub use backends::Backends;
pub use config::{AppConfig, ConfigError};
pub use directory::{EmployeeDirectory, InMemoryEmployeeDirectory, PostgresEmployeeDirectory};
pub use service::{NetworkService, ServiceError};
pub use store::{InMemoryNetworkStore, NetworkStore, PostgresNetworkStore, StoreError};
