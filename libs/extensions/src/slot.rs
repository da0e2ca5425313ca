use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::ExtensionReference;

/// Id of the slot holding the consumption extensions of `transport`.
pub fn slot_id(transport: &str) -> String {
    format!("enqueue.transport.{transport}.consumption_extensions")
}

/// Value held by a transport's extension slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// Plain ordered list; rebuilt freely.
    Sequential(Vec<ExtensionReference>),
    /// Explicitly keyed collection in declaration order. Once non-empty it has
    /// been finalized elsewhere.
    Keyed(IndexMap<String, ExtensionReference>),
}

impl Default for SlotValue {
    fn default() -> Self {
        Self::Sequential(Vec::new())
    }
}

impl SlotValue {
    // TODO: replace the shape check with an explicit "built" marker once the
    // runtime wiring can set one on customized slots.
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Keyed(entries) if !entries.is_empty())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Sequential(items) => items.len(),
            Self::Keyed(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// References in runtime order; keyed slots keep their declaration order.
    pub fn references(&self) -> Vec<&ExtensionReference> {
        match self {
            Self::Sequential(items) => items.iter().collect(),
            Self::Keyed(entries) => entries.values().collect(),
        }
    }
}

/// Named-slot storage shared between the wiring layer and the build step.
pub trait SlotStore: Send + Sync {
    fn get(&self, id: &str) -> Option<SlotValue>;
    fn set(&self, id: &str, value: SlotValue);

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// Simple in-memory slot store.
#[derive(Default)]
pub struct InMemorySlotStore {
    inner: DashMap<String, SlotValue>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the slot for `transport` with its initial value.
    pub fn define(&self, transport: &str, initial: SlotValue) {
        self.inner.insert(slot_id(transport), initial);
    }
}

impl SlotStore for InMemorySlotStore {
    fn get(&self, id: &str) -> Option<SlotValue> {
        self.inner.get(id).map(|entry| entry.clone())
    }

    fn set(&self, id: &str, value: SlotValue) {
        self.inner.insert(id.to_string(), value);
    }

    fn contains(&self, id: &str) -> bool {
        self.inner.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_non_empty_keyed_slots_are_finalized() {
        assert!(!SlotValue::default().is_finalized());
        assert!(!SlotValue::Sequential(vec!["a".into()]).is_finalized());
        assert!(!SlotValue::Keyed(IndexMap::new()).is_finalized());
        assert!(SlotValue::Keyed(IndexMap::from([("x".into(), "idA".into())])).is_finalized());
    }

    #[test]
    fn deserializes_lists_and_maps() {
        let list: SlotValue = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(list, SlotValue::Sequential(vec!["a".into(), "b".into()]));

        let keyed: SlotValue = serde_json::from_value(json!({ "x": "idA" })).unwrap();
        assert!(keyed.is_finalized());
    }

    #[test]
    fn keyed_slot_keeps_declaration_order() {
        let keyed: SlotValue =
            serde_json::from_str(r#"{ "zeta": "idZ", "alpha": "idA" }"#).unwrap();
        let ids: Vec<_> = keyed.references().into_iter().map(ExtensionReference::as_str).collect();
        assert_eq!(ids, vec!["idZ", "idA"]);
        assert_eq!(
            serde_json::to_string(&keyed).unwrap(),
            r#"{"zeta":"idZ","alpha":"idA"}"#
        );
    }

    #[test]
    fn store_round_trips_by_transport() {
        let store = InMemorySlotStore::new();
        assert!(!store.contains(&slot_id("aName")));

        store.define("aName", SlotValue::default());
        assert_eq!(
            store.get("enqueue.transport.aName.consumption_extensions"),
            Some(SlotValue::default())
        );
    }
}
