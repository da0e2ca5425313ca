use thiserror::Error;

/// Error surfaced by a driver collaborator while opening, connecting or closing a handle.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while normalizing connection config or establishing a connection.
#[derive(Error, Debug)]
pub enum DbalError {
    /// The config is neither a map, a DSN string nor empty, or a known key carries the wrong type.
    #[error("invalid connection config: {0}")]
    InvalidArgument(String),
    /// The DSN has no scheme separator, does not parse, or its scheme has illegal symbols.
    #[error("the DSN is invalid: {0}")]
    InvalidFormat(String),
    #[error(
        "the given DSN scheme \"{scheme}\" is not supported; supported schemes are: \"{}\"",
        .supported.join("\", \"")
    )]
    UnsupportedScheme {
        scheme: String,
        supported: Vec<&'static str>,
    },
    /// The driver failed to hand out or connect a handle. Never retried here.
    #[error("database connection failed: {0}")]
    ConnectionFailure(#[source] DriverError),
}

impl DbalError {
    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
