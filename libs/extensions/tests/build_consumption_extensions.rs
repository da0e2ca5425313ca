use gsm_extensions::{
    BuildConsumptionExtensions, BuildOutcome, ExtensionReference, InMemorySlotStore,
    PriorityAttr, ProviderPool, SlotStore, SlotValue, Tag, TagAttributes, build_all, slot_id,
};
use indexmap::IndexMap;

fn for_transport(transport: &str) -> Tag {
    Tag::consumption_extension(TagAttributes::new().with_transport(transport))
}

fn with_priority(priority: i64) -> Tag {
    Tag::consumption_extension(TagAttributes::new().with_priority(priority))
}

fn untagged() -> Tag {
    Tag::consumption_extension(TagAttributes::new())
}

fn store_with_empty_slot(transport: &str) -> InMemorySlotStore {
    let store = InMemorySlotStore::new();
    store.define(transport, SlotValue::default());
    store
}

fn slot_ids(store: &InMemorySlotStore, transport: &str) -> Vec<String> {
    store
        .get(&slot_id(transport))
        .expect("slot defined")
        .references()
        .into_iter()
        .map(ExtensionReference::to_string)
        .collect()
}

#[test]
fn does_nothing_when_slot_is_not_registered() {
    let store = InMemorySlotStore::new();
    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [for_transport("aName")]).unwrap();

    let pass = BuildConsumptionExtensions::new("aName").unwrap();
    assert_eq!(pass.process(&pool, &store), Ok(BuildOutcome::NotRegistered));
    assert!(!store.contains(&slot_id("aName")));
}

#[test]
fn registers_transport_extensions_in_discovery_order() {
    let store = store_with_empty_slot("aName");
    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [for_transport("aName")]).unwrap();
    pool.register("aBarExtension", [for_transport("aName")]).unwrap();

    let outcome = BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(outcome, BuildOutcome::Built { count: 2 });
    assert_eq!(slot_ids(&store, "aName"), vec!["aFooExtension", "aBarExtension"]);
}

#[test]
fn ignores_other_transports_and_untagged_providers() {
    let store = store_with_empty_slot("aName");
    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [for_transport("aName")]).unwrap();
    pool.register("aBarExtension", [for_transport("anotherName")]).unwrap();
    pool.register("aBazExtension", [for_transport("all")]).unwrap();
    pool.register("aQuxExtension", [untagged()]).unwrap();

    BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(slot_ids(&store, "aName"), vec!["aFooExtension", "aBazExtension"]);
}

#[test]
fn treats_tags_without_transport_as_default_transport() {
    let store = store_with_empty_slot("default");
    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [untagged()]).unwrap();
    pool.register("aBarExtension", [untagged()]).unwrap();

    BuildConsumptionExtensions::new("default")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(slot_ids(&store, "default"), vec!["aFooExtension", "aBarExtension"]);
}

#[test]
fn orders_extensions_by_priority() {
    let store = store_with_empty_slot("default");
    let mut pool = ProviderPool::new();
    pool.register("foo_extension", [with_priority(6)]).unwrap();
    pool.register("bar_extension", [with_priority(-5)]).unwrap();
    pool.register("baz_extension", [with_priority(2)]).unwrap();

    BuildConsumptionExtensions::new("default")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(
        slot_ids(&store, "default"),
        vec!["foo_extension", "baz_extension", "bar_extension"]
    );
}

#[test]
fn assumes_priority_zero_when_unset() {
    let store = store_with_empty_slot("default");
    let mut pool = ProviderPool::new();
    pool.register("foo_extension", [untagged()]).unwrap();
    pool.register("bar_extension", [with_priority(1)]).unwrap();
    pool.register("baz_extension", [with_priority(-1)]).unwrap();

    BuildConsumptionExtensions::new("default")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(
        slot_ids(&store, "default"),
        vec!["bar_extension", "foo_extension", "baz_extension"]
    );
}

#[test]
fn keeps_slot_finalized_by_earlier_wiring() {
    let finalized = SlotValue::Keyed(IndexMap::from([
        (
            "aBarExtension".to_string(),
            ExtensionReference::new("aBarServiceIdAddedPreviously"),
        ),
        (
            "aOloloExtension".to_string(),
            ExtensionReference::new("aOloloServiceIdAddedPreviously"),
        ),
    ]));
    let store = InMemorySlotStore::new();
    store.define("aName", finalized.clone());

    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [for_transport("aName")]).unwrap();
    pool.register("aBarExtension", [for_transport("all")]).unwrap();

    let outcome = BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(outcome, BuildOutcome::Skipped);
    assert_eq!(store.get(&slot_id("aName")), Some(finalized));
}

#[test]
fn finalized_slot_keeps_its_declared_order() {
    let store = InMemorySlotStore::new();
    let declared: SlotValue =
        serde_json::from_str(r#"{ "zeta": "idZ", "alpha": "idA" }"#).unwrap();
    store.define("aName", declared);

    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [for_transport("aName")]).unwrap();

    let outcome = BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(outcome, BuildOutcome::Skipped);
    assert_eq!(slot_ids(&store, "aName"), vec!["idZ", "idA"]);
    assert_eq!(
        serde_json::to_string(&store.get(&slot_id("aName"))).unwrap(),
        r#"{"zeta":"idZ","alpha":"idA"}"#
    );
}

#[test]
fn provider_with_several_tags_contributes_each_matching_tag() {
    let store = store_with_empty_slot("aName");
    let mut pool = ProviderPool::new();
    pool.register(
        "multi",
        [
            Tag::consumption_extension(
                TagAttributes::new().with_transport("aName").with_priority(-1),
            ),
            Tag::consumption_extension(TagAttributes::new().with_transport("all").with_priority(1)),
        ],
    )
    .unwrap();
    pool.register("single", [for_transport("aName")]).unwrap();

    BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&pool, &store)
        .unwrap();

    assert_eq!(slot_ids(&store, "aName"), vec!["multi", "single", "multi"]);
}

#[test]
fn malformed_priority_only_fails_the_transport_it_targets() {
    let store = store_with_empty_slot("aName");
    store.define("other", SlotValue::default());
    let mut pool = ProviderPool::new();
    pool.register("aFooExtension", [for_transport("aName")]).unwrap();
    let broken = TagAttributes {
        transport: Some("other".into()),
        priority: Some(PriorityAttr::Text("urgent".into())),
    };
    pool.register("aBrokenExtension", [Tag::consumption_extension(broken)]).unwrap();

    let outcome = BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&pool, &store)
        .unwrap();
    assert_eq!(outcome, BuildOutcome::Built { count: 1 });
    assert_eq!(slot_ids(&store, "aName"), vec!["aFooExtension"]);

    let err = BuildConsumptionExtensions::new("other")
        .unwrap()
        .process(&pool, &store)
        .unwrap_err();
    assert!(err.to_string().contains("aBrokenExtension"), "{err}");
}

#[test]
fn builds_every_named_transport() {
    let store = InMemorySlotStore::new();
    store.define("default", SlotValue::default());
    store.define("aName", SlotValue::default());

    let mut pool = ProviderPool::new();
    pool.register("everywhere", [for_transport("all")]).unwrap();
    pool.register("defaultOnly", [untagged()]).unwrap();

    let outcomes = build_all(["default", "aName", "missing"], &pool, &store).unwrap();

    assert_eq!(
        outcomes,
        vec![
            ("default".to_string(), BuildOutcome::Built { count: 2 }),
            ("aName".to_string(), BuildOutcome::Built { count: 1 }),
            ("missing".to_string(), BuildOutcome::NotRegistered),
        ]
    );
    assert_eq!(slot_ids(&store, "aName"), vec!["everywhere"]);
}

#[test]
#[tracing_test::traced_test]
fn skipping_a_finalized_slot_is_logged() {
    let store = InMemorySlotStore::new();
    store.define(
        "aName",
        SlotValue::Keyed(IndexMap::from([("x".to_string(), ExtensionReference::new("idA"))])),
    );

    BuildConsumptionExtensions::new("aName")
        .unwrap()
        .process(&ProviderPool::new(), &store)
        .unwrap();

    assert!(logs_contain("already finalized"));
}
