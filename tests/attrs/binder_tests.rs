use xcluster::attrs::{binder, AttrDescriptor, AttrSchema, AttrStore, AttrValue, AttributeSet, BindPhase, Constraint};

fn schema() -> AttrSchema {
    AttrSchema::new(vec![
        AttrDescriptor::string("language")
            .init()
            .constraint(Constraint::one_of(["en", "de", "pl"]))
            .default_value("en")
            .unwrap(),
        AttrDescriptor::string("query").no_default().unwrap(),
        AttrDescriptor::integer("limit")
            .in_out()
            .constraint(Constraint::int_range(1, 100))
            .default_value(10)
            .unwrap(),
        AttrDescriptor::string_array("labels").in_out().default_value(Vec::<String>::new()).unwrap(),
        AttrDescriptor::integer("hits").output().no_default().unwrap(),
    ])
    .unwrap()
}

#[test]
fn test_bind_then_harvest_returns_bound_values() {
    let schema = schema();
    let mut store = AttrStore::new();
    let values = AttributeSet::new()
        .with("limit", 25)
        .with("labels", vec!["x", "y"]);
    binder::bind(&mut store, &schema, &values, BindPhase::Request).unwrap();

    let harvested = binder::harvest(&store, &schema);
    assert_eq!(harvested.get_i64("limit"), Some(25));
    assert_eq!(
        harvested.get("labels"),
        Some(&AttrValue::StringArray(vec!["x".into(), "y".into()]))
    );
    assert_eq!(harvested.get("hits"), Some(&AttrValue::None));
    assert!(!harvested.contains("query"));
}

#[test]
fn test_phases_are_bound_separately() {
    let schema = schema();
    let mut store = AttrStore::new();
    let values = AttributeSet::new().with("language", "de").with("query", "q");

    binder::bind(&mut store, &schema, &values, BindPhase::Init).unwrap();
    assert_eq!(store.str("language"), Some("de"));
    assert_eq!(store.str("query"), None);

    binder::bind(&mut store, &schema, &values, BindPhase::Request).unwrap();
    assert_eq!(store.str("query"), Some("q"));
    assert_eq!(store.str("language"), Some("de"));
}

#[test]
fn test_failed_bind_leaves_store_untouched() {
    let schema = schema();
    let mut store = AttrStore::new();
    binder::bind(&mut store, &schema, &AttributeSet::new().with("query", "first"), BindPhase::Request).unwrap();

    let bad = AttributeSet::new().with("query", "second").with("limit", 1000);
    let err = binder::bind(&mut store, &schema, &bad, BindPhase::Request).unwrap_err();
    assert_eq!(err.attribute, "limit");
    assert_eq!(store.str("query"), Some("first"));
    assert_eq!(store.i64("limit"), Some(10));
}

#[test]
fn test_reset_restores_request_defaults_only() {
    let schema = schema();
    let mut store = AttrStore::new();
    binder::bind(&mut store, &schema, &AttributeSet::new().with("language", "pl"), BindPhase::Init).unwrap();
    binder::bind(
        &mut store,
        &schema,
        &AttributeSet::new().with("query", "q").with("limit", 3),
        BindPhase::Request,
    )
    .unwrap();
    store.set("hits", 42);

    binder::reset(&mut store, &schema);
    assert_eq!(store.str("language"), Some("pl"));
    assert_eq!(store.str("query"), None);
    assert_eq!(store.i64("limit"), Some(10));
    assert!(store.get("hits").is_none());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let schema = schema();
    let mut store = AttrStore::new();
    let values = AttributeSet::new().with("nonsense", true);
    binder::bind(&mut store, &schema, &values, BindPhase::Request).unwrap();
    assert!(store.get("nonsense").is_none());
}

#[test]
fn test_explicit_none_falls_back_to_default() {
    let schema = schema();
    let mut store = AttrStore::new();
    let values = AttributeSet::new()
        .with("language", AttrValue::None)
        .with("limit", AttrValue::None);
    binder::bind(&mut store, &schema, &values, BindPhase::Init).unwrap();
    binder::bind(&mut store, &schema, &values, BindPhase::Request).unwrap();
    assert_eq!(store.str("language"), Some("en"));
    assert_eq!(store.i64("limit"), Some(10));
}

#[test]
fn test_explicit_none_for_required_attribute_rejected() {
    let schema = AttrSchema::new(vec![AttrDescriptor::string("query").required().no_default().unwrap()]).unwrap();
    let mut store = AttrStore::new();
    let values = AttributeSet::new().with("query", AttrValue::None);
    let err = binder::bind(&mut store, &schema, &values, BindPhase::Request).unwrap_err();
    assert_eq!(err.attribute, "query");
}
