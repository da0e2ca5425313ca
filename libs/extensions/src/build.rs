//! Priority ordering and slot assembly for consumption extensions.

use tracing::{debug, info, instrument};

use crate::descriptor::{ExtensionProviderDescriptor, ExtensionReference};
use crate::errors::ExtensionsError;
use crate::pool::ProviderPool;
use crate::slot::{SlotStore, SlotValue, slot_id};

/// What the build step did to a transport's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The transport has no slot; nothing was done.
    NotRegistered,
    /// The slot held a finalized keyed collection and was left untouched.
    Skipped,
    Built { count: usize },
}

/// Sorts by priority, highest first. Equal priorities keep discovery order.
pub fn order_by_priority(
    mut selected: Vec<ExtensionProviderDescriptor>,
) -> Vec<ExtensionProviderDescriptor> {
    selected.sort_by(|a, b| b.priority.cmp(&a.priority));
    selected
}

/// Replaces `slot` with references to `selected` in priority order, unless the
/// slot is already finalized.
pub fn build(slot: &mut SlotValue, selected: Vec<ExtensionProviderDescriptor>) -> BuildOutcome {
    if slot.is_finalized() {
        return BuildOutcome::Skipped;
    }

    let references: Vec<_> = order_by_priority(selected)
        .into_iter()
        .map(|descriptor| ExtensionReference::new(descriptor.id))
        .collect();
    let count = references.len();
    *slot = SlotValue::Sequential(references);
    BuildOutcome::Built { count }
}

/// Build step assembling the consumption extensions of one named transport.
#[derive(Debug, Clone)]
pub struct BuildConsumptionExtensions {
    name: String,
}

impl BuildConsumptionExtensions {
    pub fn new(name: impl Into<String>) -> Result<Self, ExtensionsError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ExtensionsError::InvalidArgument(
                "The name could not be empty.".into(),
            ));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot_id(&self) -> String {
        slot_id(&self.name)
    }

    #[instrument(name = "extensions.build", skip_all, fields(transport = %self.name))]
    pub fn process<S>(
        &self,
        pool: &ProviderPool,
        store: &S,
    ) -> Result<BuildOutcome, ExtensionsError>
    where
        S: SlotStore + ?Sized,
    {
        let slot_id = self.slot_id();
        let Some(mut slot) = store.get(&slot_id) else {
            debug!(slot = %slot_id, "extension slot not registered");
            return Ok(BuildOutcome::NotRegistered);
        };

        let selected = pool.consumption_extensions_for(&self.name)?;
        let outcome = build(&mut slot, selected);
        match outcome {
            BuildOutcome::Built { count } => {
                store.set(&slot_id, slot);
                info!(slot = %slot_id, count, "consumption extensions assembled");
            }
            BuildOutcome::Skipped => {
                debug!(slot = %slot_id, "extension slot already finalized; leaving it untouched");
            }
            BuildOutcome::NotRegistered => {}
        }
        Ok(outcome)
    }
}

/// Runs the build step for every transport in `names`.
pub fn build_all<'a, S>(
    names: impl IntoIterator<Item = &'a str>,
    pool: &ProviderPool,
    store: &S,
) -> Result<Vec<(String, BuildOutcome)>, ExtensionsError>
where
    S: SlotStore + ?Sized,
{
    names
        .into_iter()
        .map(|name| -> Result<_, ExtensionsError> {
            let pass = BuildConsumptionExtensions::new(name)?;
            let outcome = pass.process(pool, store)?;
            Ok((name.to_string(), outcome))
        })
        .collect()
}
