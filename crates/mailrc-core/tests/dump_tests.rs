//! Dump, text rendering and snapshots

use mailrc_core::{ConfigDef, ConfigSet, DefFlags, DumpFlags, SubsetId, TypeTag};
use pretty_assertions::assert_eq;

fn config() -> ConfigSet {
    let mut cs = ConfigSet::new();
    cs.register([
        ConfigDef::new("beep", TypeTag::BOOL).initial("yes"),
        ConfigDef::new("password", TypeTag::STRING).flags(DefFlags::SENSITIVE),
        ConfigDef::new("signature", TypeTag::STRING).initial("--"),
        ConfigDef::new("wrap", TypeTag::NUMBER).initial("72"),
    ])
    .unwrap();
    cs
}

#[test]
fn test_dump_is_sorted_with_overrides_last() {
    let mut cs = config();
    cs.subset_new("work", SubsetId::ROOT).unwrap();
    cs.string_set("work:wrap", "100").unwrap();

    let names: Vec<String> = cs
        .dump(DumpFlags::empty())
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(
        names,
        vec!["beep", "password", "signature", "wrap", "work:wrap"]
    );
}

#[test]
fn test_dump_only_changed() {
    let mut cs = config();
    cs.string_set("wrap", "80").unwrap();
    cs.subset_new("work", SubsetId::ROOT).unwrap();
    cs.string_set("work:beep", "yes").unwrap();
    cs.string_set("work:signature", "Cheers").unwrap();

    let entries = cs.dump(DumpFlags::ONLY_CHANGED);
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    // work:beep overrides with the value it would inherit anyway
    assert_eq!(names, vec!["wrap", "work:signature"]);
    assert_eq!(entries[1].scope.as_deref(), Some("work"));
    assert_eq!(entries[1].initial, "--");
}

#[test]
fn test_dump_text() {
    let mut cs = config();
    cs.string_set("password", "hunter2").unwrap();
    cs.string_set("signature", "say \"hi\"").unwrap();

    assert_eq!(
        cs.dump_text(DumpFlags::HIDE_SENSITIVE),
        concat!(
            "set beep = yes\n",
            "set password = \"***\"\n",
            "set signature = \"say \\\"hi\\\"\"\n",
            "set wrap = 72\n",
        )
    );
}

#[test]
fn test_dump_text_with_defaults() {
    let mut cs = config();
    cs.string_set("wrap", "80").unwrap();

    assert_eq!(
        cs.dump_text(DumpFlags::ONLY_CHANGED | DumpFlags::SHOW_DEFAULTS),
        "# wrap = 72\nset wrap = 80\n"
    );
}

#[test]
fn test_snapshot_toml() {
    let mut cs = config();
    cs.string_set("password", "hunter2").unwrap();
    cs.subset_new("work", SubsetId::ROOT).unwrap();
    cs.string_set("work:signature", "Cheers").unwrap();

    let snapshot = cs.snapshot(DumpFlags::HIDE_SENSITIVE);
    assert_eq!(snapshot.global["password"], "***");
    assert_eq!(snapshot.scopes["work"]["signature"], "Cheers");

    let text = snapshot.to_toml().unwrap();
    assert!(text.contains("[global]"), "{text}");
    assert!(text.contains("[scopes.work]"), "{text}");
    assert!(text.contains("signature = \"Cheers\""), "{text}");
}

#[test]
fn test_snapshot_json() {
    let mut cs = config();
    cs.string_set("wrap", "80").unwrap();

    let json = cs.snapshot(DumpFlags::ONLY_CHANGED).to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["global"]["wrap"], "80");
    assert_eq!(parsed["global"].as_object().unwrap().len(), 1);
    assert!(parsed["scopes"].as_object().unwrap().is_empty());
}

#[test]
fn test_dump_entry_serializes_type() {
    let cs = config();
    let entries = cs.dump(DumpFlags::empty());
    let json = serde_json::to_value(&entries[0]).unwrap();
    assert_eq!(json["type"], "bool");
    assert_eq!(json["value"], "yes");
    assert!(json.get("scope").is_none());
}

#[test]
fn test_dump_text_snapshot() {
    let mut cs = config();
    cs.string_set("beep", "no").unwrap();
    cs.subset_new("work", SubsetId::ROOT).unwrap();
    cs.string_set("work:signature", "Cheers").unwrap();

    insta::assert_snapshot!(cs.dump_text(DumpFlags::SHOW_DEFAULTS | DumpFlags::HIDE_SENSITIVE), @r#"
    # beep = yes
    set beep = no
    # password = "***"
    set password = "***"
    # signature = "--"
    set signature = "--"
    # wrap = 72
    set wrap = 72
    # work:signature = "--"
    set work:signature = "Cheers"
    "#);
}
