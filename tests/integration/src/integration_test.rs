//! End-to-end test of a mail client start-up
//!
//! Several subsystems register their variables, the user's settings are
//! applied before startup completes, accounts get their own scopes and the
//! result is exported.

use std::collections::BTreeMap;

use mailrc_core::{
    ConfigDef, ConfigSet, DefFlags, DumpFlags, Error, EventKind, SubsetId, TypeTag, Validation,
    Value,
};
use mailrc_expando::{Expando, ExpandoDefinition, Node};
use mailrc_test_utils::EventLog;
use pretty_assertions::assert_eq;

static INDEX_FORMAT: &[ExpandoDefinition] = &[
    ExpandoDefinition::new("C", "number", 2, 1),
    ExpandoDefinition::new("d", "date", 2, 2),
    ExpandoDefinition::new("f", "from", 2, 3),
    ExpandoDefinition::new("s", "subject", 2, 4),
    ExpandoDefinition::new("Z", "flags", 2, 5),
    ExpandoDefinition::new("cr", "reply-count", 2, 6),
];

static STATUS_FORMAT: &[ExpandoDefinition] = &[
    ExpandoDefinition::new("f", "folder", 3, 1),
    ExpandoDefinition::new("n", "new", 3, 2),
    ExpandoDefinition::new("u", "unread", 3, 3),
];

fn index_vars() -> Vec<ConfigDef> {
    vec![
        ConfigDef::new("index_format", TypeTag::EXPANDO)
            .initial("%4C %Z %{date} %-15.15f %s")
            .expando_defs(INDEX_FORMAT)
            .flags(DefFlags::NOT_EMPTY)
            .docs("printf-like format string for the index menu"),
        ConfigDef::new("status_format", TypeTag::EXPANDO)
            .initial("%f%<n? [new: %n]>%>-")
            .expando_defs(STATUS_FORMAT),
    ]
}

fn send_vars() -> Vec<ConfigDef> {
    vec![
        ConfigDef::new("from", TypeTag::STRING),
        ConfigDef::new("signature", TypeTag::STRING).initial("~/.signature"),
        ConfigDef::new("smtp_pass", TypeTag::STRING).flags(DefFlags::SENSITIVE),
        ConfigDef::new("wrap", TypeTag::NUMBER)
            .initial("72")
            .flags(DefFlags::NOT_NEGATIVE)
            .validator(|_, value| match value.as_number() {
                Some(n) if n > 0 && n < 20 => Validation::Warn(format!("wrap={n} is very narrow")),
                _ => Validation::Accept,
            }),
        ConfigDef::new("header_cache", TypeTag::STRING).flags(DefFlags::ON_STARTUP),
    ]
}

fn boot() -> ConfigSet {
    let mut cs = ConfigSet::new();
    cs.register(index_vars()).unwrap();
    cs.register(send_vars()).unwrap();
    cs.register_synonym("indexformat", "index_format").unwrap();

    // The user's config file
    cs.string_set("header_cache", "~/.cache/mail").unwrap();
    cs.string_set("from", "me@example.org").unwrap();
    cs.string_set("smtp_pass", "hunter2").unwrap();
    cs.set_startup_complete(true);
    cs
}

#[test]
fn test_accounts_share_and_override() {
    let mut cs = boot();
    let log = EventLog::new();
    log.attach(&mut cs);

    let work = cs.subset_new("work", SubsetId::ROOT).unwrap();
    let home = cs.subset_new("home", SubsetId::ROOT).unwrap();
    for id in [work, home] {
        let name = cs.scoped_name(id, "from").unwrap();
        cs.create_inheritance(&name).unwrap();
    }

    cs.string_set("work:from", "me@work.example").unwrap();
    cs.string_set("work:signature", "~/.signature-work").unwrap();
    assert_eq!(cs.string_get("work:from").unwrap(), "me@work.example");
    assert_eq!(cs.string_get("home:from").unwrap(), "me@example.org");

    cs.string_set("from", "me@example.net").unwrap();
    assert_eq!(cs.string_get("home:from").unwrap(), "me@example.net");
    assert_eq!(cs.string_get("work:from").unwrap(), "me@work.example");

    cs.subset_free(work).unwrap();
    assert_eq!(cs.string_get("from").unwrap(), "me@example.net");
    assert!(cs.string_get("work:from").is_err());

    let scopes: Vec<Option<String>> = log.events().into_iter().map(|e| e.scope).collect();
    assert_eq!(
        scopes,
        vec![Some("work".to_string()), Some("work".to_string()), None]
    );
}

#[test]
fn test_index_format_through_synonym() {
    let mut cs = boot();

    cs.string_set("indexformat", "%-20s %cr").unwrap();
    let value = cs.native_get("index_format").unwrap();
    let compiled = value.as_expando().unwrap();
    let codes: Vec<&str> = compiled
        .nodes()
        .iter()
        .flat_map(Node::directives)
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec!["s", "cr"]);

    cs.plus_equals("index_format", "%Z").unwrap();
    assert_eq!(cs.string_get("index_format").unwrap(), "%-20s %cr %Z");

    let err = cs.string_set("index_format", "").unwrap_err();
    assert!(matches!(err, Error::EmptyValue { .. }));

    let err = cs.string_set("status_format", "%<n?new").unwrap_err();
    assert!(err.to_string().contains("Unterminated conditional"), "{err}");
}

#[test]
fn test_precompiled_value_handover() {
    let mut cs = boot();

    let compiled = Expando::parse("%u unread in %f", STATUS_FORMAT).unwrap();
    let status = cs
        .native_set("status_format", Value::Expando(compiled))
        .unwrap();
    assert!(status.changed);

    // Compiled against the wrong table: the value comes back untouched
    let foreign = Expando::parse("%s", INDEX_FORMAT).unwrap();
    let err = cs
        .native_set("wrap", Value::Expando(foreign.clone()))
        .unwrap_err();
    assert!(matches!(err.error, Error::TypeMismatch { .. }));
    assert_eq!(err.into_value(), Value::Expando(foreign));
}

#[test]
fn test_validator_warning_and_startup_lock() {
    let mut cs = boot();

    let status = cs.string_set("wrap", "10").unwrap();
    assert_eq!(status.warning.as_deref(), Some("wrap=10 is very narrow"));
    assert!(cs.string_set("wrap", "-1").is_err());
    assert_eq!(cs.string_get("wrap").unwrap(), "10");

    assert!(matches!(
        cs.string_set("header_cache", "/tmp"),
        Err(Error::StartupOnly { .. })
    ));
    assert!(matches!(
        cs.reset("header_cache"),
        Err(Error::StartupOnly { .. })
    ));
}

#[test]
fn test_export_after_session() {
    let mut cs = boot();
    let log = EventLog::new();
    log.attach(&mut cs);
    cs.subset_new("work", SubsetId::ROOT).unwrap();
    cs.string_set("work:wrap", "100").unwrap();
    cs.reset("from").unwrap();

    let text = cs.dump_text(DumpFlags::ONLY_CHANGED | DumpFlags::HIDE_SENSITIVE);
    assert_eq!(
        text,
        concat!(
            "set header_cache = \"~/.cache/mail\"\n",
            "set smtp_pass = \"***\"\n",
            "set work:wrap = 100\n",
        )
    );

    let toml_text = cs
        .snapshot(DumpFlags::ONLY_CHANGED | DumpFlags::HIDE_SENSITIVE)
        .to_toml()
        .unwrap();
    let parsed: BTreeMap<String, BTreeMap<String, toml::Value>> =
        toml::from_str(&toml_text).unwrap();
    assert_eq!(
        parsed["global"]["header_cache"].as_str(),
        Some("~/.cache/mail")
    );
    assert_eq!(
        parsed["scopes"]["work"]["wrap"].as_str(),
        Some("100")
    );

    let json_text = cs
        .snapshot(DumpFlags::ONLY_CHANGED | DumpFlags::HIDE_SENSITIVE)
        .to_json()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(json["global"]["smtp_pass"], "***");
    assert_eq!(json["global"]["header_cache"], "~/.cache/mail");
    assert_eq!(json["scopes"]["work"]["wrap"], "100");
    assert!(json["global"].get("from").is_none());

    assert_eq!(log.kinds(), vec![EventKind::Set, EventKind::Reset]);
}
