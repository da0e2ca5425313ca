use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::errors::ExtensionsError;

/// Transport attribute value that applies a provider to every transport.
pub const ALL_TRANSPORTS: &str = "all";
/// Transport a provider without a transport attribute applies to.
pub const DEFAULT_TRANSPORT: &str = "default";

/// Priority as declared on a tag; wiring files sometimes quote numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriorityAttr {
    Int(i64),
    Text(String),
}

/// Attributes declared on a provider tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityAttr>,
}

impl TagAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(PriorityAttr::Int(priority));
        self
    }

    /// Resolves the declared priority, defaulting to `0`.
    pub fn resolve_priority(&self, id: &str) -> Result<i64, ExtensionsError> {
        match &self.priority {
            None => Ok(0),
            Some(PriorityAttr::Int(value)) => Ok(*value),
            Some(PriorityAttr::Text(raw)) => raw.trim().parse().map_err(|_| {
                ExtensionsError::InvalidAttribute {
                    id: id.to_string(),
                    reason: format!("priority `{raw}` is not an integer"),
                }
            }),
        }
    }
}

/// One applicable (provider, tag) pair, as seen by the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionProviderDescriptor {
    pub id: String,
    pub transport: Option<String>,
    pub priority: i64,
}

impl ExtensionProviderDescriptor {
    pub fn new(id: impl Into<String>, transport: Option<&str>, priority: i64) -> Self {
        Self {
            id: id.into(),
            transport: transport.map(str::to_string),
            priority,
        }
    }

    pub(crate) fn from_tag(id: &str, attributes: &TagAttributes) -> Result<Self, ExtensionsError> {
        Ok(Self {
            id: id.to_string(),
            transport: attributes.transport.clone(),
            priority: attributes.resolve_priority(id)?,
        })
    }

    /// Whether this provider contributes to the transport called `transport_name`.
    pub fn applies_to(&self, transport_name: &str) -> bool {
        targets(self.transport.as_deref(), transport_name)
    }
}

/// Matches a declared transport attribute against a transport name.
pub(crate) fn targets(declared: Option<&str>, transport_name: &str) -> bool {
    match declared {
        Some(transport) => transport == transport_name || transport == ALL_TRANSPORTS,
        None => transport_name == DEFAULT_TRANSPORT,
    }
}

/// Opaque reference to a provider, resolved by the runtime that reads the slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionReference(String);

impl ExtensionReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExtensionReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
