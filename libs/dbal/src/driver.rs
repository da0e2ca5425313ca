//! Driver collaborator contracts plus an in-memory driver for tests and dry runs.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use serde_json::{Map, Value};

use crate::errors::DriverError;

/// Live handle produced by a [`DriverManager`].
pub trait DriverConnection: Send + Sync {
    /// Performs the explicit connect/handshake step.
    fn connect(&self) -> Result<(), DriverError>;
    fn close(&self) -> Result<(), DriverError>;
}

/// Shared trait object wrapper.
pub type SharedConnection = Arc<dyn DriverConnection>;

/// Hands out driver handles for normalized `connection` options.
pub trait DriverManager: Send + Sync {
    fn get_connection(&self, options: &Map<String, Value>) -> Result<SharedConnection, DriverError>;
}

/// Driver that never touches the network. It records every handle it creates.
#[derive(Clone, Default)]
pub struct InMemoryDriver {
    inner: Arc<InMemoryDriverState>,
}

#[derive(Default)]
struct InMemoryDriverState {
    created: AtomicUsize,
    fail_connect: AtomicBool,
    handles: Mutex<Vec<Arc<InMemoryConnection>>>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `connect` call fail.
    pub fn fail_connect(&self, fail: bool) {
        self.inner.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Number of handles handed out so far.
    pub fn created(&self) -> usize {
        self.inner.created.load(Ordering::SeqCst)
    }

    pub fn handles(&self) -> Vec<Arc<InMemoryConnection>> {
        self.inner
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DriverManager for InMemoryDriver {
    fn get_connection(
        &self,
        options: &Map<String, Value>,
    ) -> Result<SharedConnection, DriverError> {
        self.inner.created.fetch_add(1, Ordering::SeqCst);
        let handle = Arc::new(InMemoryConnection {
            options: options.clone(),
            fail_connect: self.inner.fail_connect.load(Ordering::SeqCst),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        });
        self.inner
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle.clone());
        Ok(handle)
    }
}

/// Handle created by [`InMemoryDriver`].
pub struct InMemoryConnection {
    options: Map<String, Value>,
    fail_connect: bool,
    connected: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryConnection {
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl DriverConnection for InMemoryConnection {
    fn connect(&self) -> Result<(), DriverError> {
        if self.fail_connect {
            return Err("connection refused".into());
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<(), DriverError> {
        self.connected.store(false, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
