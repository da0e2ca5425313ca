use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{ExtensionProviderDescriptor, TagAttributes, targets};
use crate::errors::ExtensionsError;

/// Tag carried by providers that hook into message consumption.
pub const CONSUMPTION_EXTENSION_TAG: &str = "enqueue.transport.consumption_extension";

fn consumption_tag_name() -> String {
    CONSUMPTION_EXTENSION_TAG.to_string()
}

/// Capability tag declared by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default = "consumption_tag_name")]
    pub name: String,
    #[serde(flatten)]
    pub attributes: TagAttributes,
}

impl Tag {
    pub fn new(name: impl Into<String>, attributes: TagAttributes) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    pub fn consumption_extension(attributes: TagAttributes) -> Self {
        Self::new(CONSUMPTION_EXTENSION_TAG, attributes)
    }
}

/// A provider and every tag it declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistration {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// In-memory pool of tagged providers, in registration order.
#[derive(Debug, Default)]
pub struct ProviderPool {
    providers: Vec<ProviderRegistration>,
}

impl ProviderPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from registrations, rejecting duplicate ids.
    pub fn from_registrations(
        registrations: impl IntoIterator<Item = ProviderRegistration>,
    ) -> Result<Self, ExtensionsError> {
        let mut pool = Self::new();
        for registration in registrations {
            pool.add(registration)?;
        }
        Ok(pool)
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Result<(), ExtensionsError> {
        self.add(ProviderRegistration {
            id: id.into(),
            tags: tags.into_iter().collect(),
        })
    }

    pub fn add(&mut self, registration: ProviderRegistration) -> Result<(), ExtensionsError> {
        if registration.id.trim().is_empty() {
            return Err(ExtensionsError::InvalidArgument(
                "provider id must not be empty".into(),
            ));
        }
        if self.contains(&registration.id) {
            return Err(ExtensionsError::AlreadyRegistered(registration.id));
        }
        self.providers.push(registration);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.iter().any(|provider| provider.id == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Yields `(provider id, attributes)` for every tag named `tag`, in discovery order.
    pub fn tagged<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a TagAttributes)> {
        self.providers.iter().flat_map(move |provider| {
            provider
                .tags
                .iter()
                .filter(move |candidate| candidate.name == tag)
                .map(move |candidate| (provider.id.as_str(), &candidate.attributes))
        })
    }

    /// Every consumption-extension tag resolved into a descriptor, in discovery order.
    pub fn consumption_extensions(
        &self,
    ) -> Result<Vec<ExtensionProviderDescriptor>, ExtensionsError> {
        self.tagged(CONSUMPTION_EXTENSION_TAG)
            .map(|(id, attributes)| ExtensionProviderDescriptor::from_tag(id, attributes))
            .collect()
    }

    /// Consumption-extension descriptors that apply to `transport_name`, in
    /// discovery order. Only the matching tags have their priority resolved.
    pub fn consumption_extensions_for(
        &self,
        transport_name: &str,
    ) -> Result<Vec<ExtensionProviderDescriptor>, ExtensionsError> {
        let selected = self
            .tagged(CONSUMPTION_EXTENSION_TAG)
            .filter(|(_, attributes)| targets(attributes.transport.as_deref(), transport_name))
            .map(|(id, attributes)| ExtensionProviderDescriptor::from_tag(id, attributes))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            transport = transport_name,
            selected = selected.len(),
            "selected consumption extensions"
        );
        Ok(selected)
    }
}
