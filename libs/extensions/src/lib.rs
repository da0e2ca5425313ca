//! Consumption extension assembly for named transports.
//!
//! Providers are registered in a [`ProviderPool`] with capability tags. For each
//! transport, [`BuildConsumptionExtensions`] selects the providers tagged for it,
//! orders them by priority and writes the resulting reference list into the
//! transport's slot, unless that slot already holds a finalized keyed collection.

pub mod build;
pub mod descriptor;
pub mod errors;
pub mod pool;
pub mod select;
pub mod slot;

pub use build::{BuildConsumptionExtensions, BuildOutcome, build, build_all, order_by_priority};
pub use descriptor::{
    ALL_TRANSPORTS, DEFAULT_TRANSPORT, ExtensionProviderDescriptor, ExtensionReference,
    PriorityAttr, TagAttributes,
};
pub use errors::ExtensionsError;
pub use pool::{CONSUMPTION_EXTENSION_TAG, ProviderPool, ProviderRegistration, Tag};
pub use select::select;
pub use slot::{InMemorySlotStore, SlotStore, SlotValue, slot_id};
