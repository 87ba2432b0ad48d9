//! Behaviour contracts of the registry, checked across crates

use mailrc_core::{ConfigDef, ConfigSet, DefFlags, Error, SubsetId, TypeTag};
use mailrc_expando::Expando;
use mailrc_test_utils::{EventLog, FruitFixture, TEST_FORMAT_DEFS};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fruit() -> FruitFixture {
    FruitFixture::new()
}

#[test]
fn test_empty_value_is_refused() {
    let mut f = fruit();
    assert!(matches!(
        f.cs.string_set("Fig", ""),
        Err(Error::EmptyValue { .. })
    ));
    assert_eq!(f.get("Fig"), "fig");
}

#[test]
fn test_plus_equals_appends_fragment() {
    let mut f = fruit();
    f.cs.string_set("Tangerine", "%a %b").unwrap();
    f.cs.plus_equals("Tangerine", " %c").unwrap();
    assert_eq!(f.get("Tangerine"), "%a %b %c");

    assert!(f.cs.plus_equals("Tangerine", "%Q").is_err());
    assert_eq!(f.get("Tangerine"), "%a %b %c");
}

#[test]
fn test_rejecting_validator_keeps_default() {
    let mut f = fruit();
    assert!(f.cs.string_set("Raspberry", "hello").is_err());
    assert_eq!(f.get("Raspberry"), f.cs.initial_get("Raspberry").unwrap());
}

#[test]
fn test_child_override_and_reset() {
    let mut f = fruit();
    f.cs.subset_new("fruit", SubsetId::ROOT).unwrap();

    f.cs.string_set("Strawberry", "hello").unwrap();
    assert_eq!(f.get("fruit:Strawberry"), "hello");

    f.cs.string_set("fruit:Strawberry", "world").unwrap();
    assert_eq!(f.get("fruit:Strawberry"), "world");
    assert_eq!(f.get("Strawberry"), "hello");

    f.cs.reset("fruit:Strawberry").unwrap();
    assert_eq!(f.get("fruit:Strawberry"), "hello");
}

#[test]
fn test_registry_teardown_releases_scopes() {
    let mut cs = ConfigSet::new();
    cs.register([ConfigDef::new("Apple", TypeTag::STRING)
        .initial("a")
        .flags(DefFlags::NOT_EMPTY)])
        .unwrap();
    let parent = cs.subset_new("parent", SubsetId::ROOT).unwrap();
    cs.subset_new("child", parent).unwrap();
    cs.string_set("child:Apple", "b").unwrap();
    assert_eq!(cs.string_get("parent:Apple").unwrap(), "a");
    drop(cs);
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{1,4}",
        Just("%a".to_string()),
        Just("%-5.3b".to_string()),
        Just("%{cat}".to_string()),
        Just("%<a?x&y>".to_string()),
        Just("%?b?yes?".to_string()),
        Just("%>.".to_string()),
        Just("%%".to_string()),
    ]
}

fn format_string() -> impl Strategy<Value = String> {
    proptest::collection::vec(fragment(), 0..6).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_set_then_get_is_exact(text in format_string()) {
        let mut f = fruit();
        f.cs.string_set("Damson", &text).unwrap();
        prop_assert_eq!(f.get("Damson"), text);
    }

    #[test]
    fn prop_stored_tree_recompiles(text in format_string()) {
        let mut f = fruit();
        f.cs.string_set("Damson", &text).unwrap();
        let stored = f.cs.native_get("Damson").unwrap().as_expando().unwrap().clone();
        let again = Expando::parse(stored.as_str(), TEST_FORMAT_DEFS).unwrap();
        prop_assert!(stored.structurally_eq(&again));
    }

    #[test]
    fn prop_reset_restores_initial(texts in proptest::collection::vec(format_string(), 0..5)) {
        let mut f = fruit();
        for text in &texts {
            f.cs.string_set("Elderberry", text).unwrap();
        }
        f.cs.reset("Elderberry").unwrap();
        prop_assert_eq!(f.get("Elderberry"), f.cs.initial_get("Elderberry").unwrap());
    }

    #[test]
    fn prop_empty_plus_equals_is_silent(text in format_string()) {
        let mut f = fruit();
        f.cs.string_set("Tangerine", &text).unwrap();
        let log = EventLog::new();
        log.attach(&mut f.cs);

        let status = f.cs.plus_equals("Tangerine", "").unwrap();
        prop_assert!(status.is_no_change());
        prop_assert_eq!(f.get("Tangerine"), text);
        prop_assert!(log.is_empty());
    }

    #[test]
    fn prop_child_tracks_parent(texts in proptest::collection::vec(format_string(), 1..5)) {
        let mut f = fruit();
        f.cs.subset_new("fruit", SubsetId::ROOT).unwrap();
        for text in &texts {
            f.cs.string_set("Strawberry", text).unwrap();
            prop_assert_eq!(f.get("fruit:Strawberry"), f.get("Strawberry"));
        }
    }
}
