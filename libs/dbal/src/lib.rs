//! Database-backed transport bootstrap.
//!
//! Normalizes connection config (a DSN string, an option map, or nothing) into a
//! [`ConnectionDescriptor`] and wraps it in a [`ConnectionFactory`] that connects
//! lazily or eagerly through a pluggable [`DriverManager`].
//!
//! ```
//! use std::sync::Arc;
//! use gsm_dbal::{ConnectionFactory, InMemoryDriver};
//!
//! let driver = InMemoryDriver::new();
//! let factory = ConnectionFactory::from_input("mysql+pdo:", Arc::new(driver.clone()))?;
//! assert_eq!(factory.descriptor().url(), Some("pdo_mysql://root@localhost"));
//!
//! let context = factory.create_context()?;
//! assert_eq!(driver.created(), 0);
//! context.connection()?;
//! assert_eq!(driver.created(), 1);
//! # Ok::<(), gsm_dbal::DbalError>(())
//! ```

pub mod config;
pub mod context;
pub mod driver;
pub mod dsn;
pub mod env;
pub mod errors;
pub mod factory;

pub use config::{ConnectionDescriptor, ConnectionInput, DsnInfo, normalize};
pub use context::DbalContext;
pub use driver::{
    DriverConnection, DriverManager, InMemoryConnection, InMemoryDriver, SharedConnection,
};
pub use dsn::{ParsedDsn, parse_dsn, supported_schemes};
pub use env::DbalEnvConfig;
pub use errors::{DbalError, DriverError};
pub use factory::ConnectionFactory;
