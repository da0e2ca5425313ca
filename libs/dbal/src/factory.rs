use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, instrument, warn};

use crate::config::{ConnectionDescriptor, ConnectionInput, normalize};
use crate::context::DbalContext;
use crate::driver::{DriverManager, SharedConnection};
use crate::errors::DbalError;

/// Memoized, single-flight accessor around the driver connect call.
pub(crate) struct ConnectionCell {
    driver: Arc<dyn DriverManager>,
    descriptor: Arc<ConnectionDescriptor>,
    handle: Mutex<Option<SharedConnection>>,
}

impl ConnectionCell {
    fn new(driver: Arc<dyn DriverManager>, descriptor: Arc<ConnectionDescriptor>) -> Self {
        Self {
            driver,
            descriptor,
            handle: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<SharedConnection>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached handle, establishing it first if needed. The lock is
    /// held across the driver calls so racing callers share one handle.
    #[instrument(
        name = "dbal.establish",
        skip_all,
        fields(table_name = %self.descriptor.table_name)
    )]
    pub(crate) fn establish(&self) -> Result<SharedConnection, DbalError> {
        let mut slot = self.slot();
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let handle = self
            .driver
            .get_connection(&self.descriptor.connection)
            .map_err(DbalError::ConnectionFailure)?;
        handle.connect().map_err(DbalError::ConnectionFailure)?;
        info!(
            driver = self
                .descriptor
                .dsn
                .as_ref()
                .map(|dsn| dsn.driver_id)
                .unwrap_or("custom"),
            "database connection established"
        );

        *slot = Some(handle.clone());
        Ok(handle)
    }

    fn close(&self) -> Result<(), DbalError> {
        let Some(handle) = self.slot().take() else {
            return Ok(());
        };
        handle.close().map_err(|err| {
            warn!(error = %err, "failed to close database connection");
            DbalError::ConnectionFailure(err)
        })
    }

    fn is_established(&self) -> bool {
        self.slot().is_some()
    }
}

/// Owns a normalized descriptor and at most one live connection handle.
///
/// Lazy descriptors defer the connect call until a context first asks for the
/// connection. Eager descriptors connect while the factory is constructed.
pub struct ConnectionFactory {
    descriptor: Arc<ConnectionDescriptor>,
    cell: Arc<ConnectionCell>,
}

impl ConnectionFactory {
    pub fn new(
        descriptor: ConnectionDescriptor,
        driver: Arc<dyn DriverManager>,
    ) -> Result<Self, DbalError> {
        let descriptor = Arc::new(descriptor);
        let cell = Arc::new(ConnectionCell::new(driver, descriptor.clone()));
        if !descriptor.lazy {
            cell.establish()?;
        }
        Ok(Self { descriptor, cell })
    }

    /// Normalizes `input` and builds a factory from the result.
    pub fn from_input(
        input: impl Into<ConnectionInput>,
        driver: Arc<dyn DriverManager>,
    ) -> Result<Self, DbalError> {
        Self::new(normalize(input.into())?, driver)
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn create_context(&self) -> Result<DbalContext, DbalError> {
        if self.descriptor.lazy {
            return Ok(DbalContext::deferred(
                self.cell.clone(),
                self.descriptor.clone(),
            ));
        }
        let handle = self.cell.establish()?;
        Ok(DbalContext::live(handle, self.descriptor.clone()))
    }

    /// Closes the live handle, if any. The next access reconnects.
    pub fn close(&self) -> Result<(), DbalError> {
        self.cell.close()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.is_established()
    }
}
