use std::sync::Arc;
use std::time::Duration;

use crate::config::ConnectionDescriptor;
use crate::driver::SharedConnection;
use crate::errors::DbalError;
use crate::factory::ConnectionCell;

enum Connector {
    Live(SharedConnection),
    Deferred(Arc<ConnectionCell>),
}

/// Transport-facing view over a factory's connection and queue settings.
pub struct DbalContext {
    connector: Connector,
    descriptor: Arc<ConnectionDescriptor>,
}

impl DbalContext {
    pub(crate) fn live(handle: SharedConnection, descriptor: Arc<ConnectionDescriptor>) -> Self {
        Self {
            connector: Connector::Live(handle),
            descriptor,
        }
    }

    pub(crate) fn deferred(
        cell: Arc<ConnectionCell>,
        descriptor: Arc<ConnectionDescriptor>,
    ) -> Self {
        Self {
            connector: Connector::Deferred(cell),
            descriptor,
        }
    }

    /// Resolves the connection, connecting on first use for lazy contexts.
    pub fn connection(&self) -> Result<SharedConnection, DbalError> {
        match &self.connector {
            Connector::Live(handle) => Ok(handle.clone()),
            Connector::Deferred(cell) => cell.establish(),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.connector, Connector::Deferred(_))
    }

    pub fn table_name(&self) -> &str {
        &self.descriptor.table_name
    }

    pub fn polling_interval(&self) -> Duration {
        self.descriptor.polling_interval()
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }
}
