/// Errors produced while registering providers or assembling extension slots.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ExtensionsError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("provider `{0}` already registered")]
    AlreadyRegistered(String),
    #[error("provider `{id}` has an invalid tag attribute: {reason}")]
    InvalidAttribute { id: String, reason: String },
}
