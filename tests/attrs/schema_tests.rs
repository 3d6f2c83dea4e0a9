use xcluster::attrs::{AttrDescriptor, AttrKind, AttrSchema, AttrValue, BindPhase, Constraint, Direction};
use xcluster::error::SchemaError;

#[test]
fn test_string_array_default_forms_agree() {
    let two_part = AttrDescriptor::string_array("fields")
        .default_values("a", ["b"])
        .unwrap();
    let sequence = AttrDescriptor::string_array("fields")
        .default_value(["a", "b"])
        .unwrap();
    let expected = AttrValue::StringArray(vec!["a".into(), "b".into()]);
    assert_eq!(two_part.default_value(), &expected);
    assert_eq!(sequence.default_value(), &expected);

    let single = AttrDescriptor::string_array("fields")
        .default_values("only", Vec::<String>::new())
        .unwrap();
    assert_eq!(single.default_value().as_string_array().map(<[_]>::len), Some(1));
}

#[test]
fn test_descriptor_metadata() {
    let d = AttrDescriptor::float("threshold")
        .label("Similarity threshold")
        .init()
        .constraint(Constraint::float_range(0.0, 1.0))
        .default_value(0.5)
        .unwrap();
    assert_eq!(d.kind(), AttrKind::Float);
    assert_eq!(d.phase(), BindPhase::Init);
    assert_eq!(d.direction(), Direction::Input);
    assert_eq!(d.label(), "Similarity threshold");
    assert!(!d.is_required());
}

#[test]
fn test_default_must_satisfy_constraint() {
    let err = AttrDescriptor::integer("max_clusters")
        .constraint(Constraint::int_range(1, 10))
        .default_value(0)
        .unwrap_err();
    assert!(matches!(err, SchemaError::DefaultRejected { ref attribute, .. } if attribute == "max_clusters"));

    let err = AttrDescriptor::boolean("flag").default_value("maybe").unwrap_err();
    assert!(matches!(err, SchemaError::DefaultRejected { .. }));
}

#[test]
fn test_required_without_default() {
    let d = AttrDescriptor::documents("documents").required().no_default().unwrap();
    assert!(d.is_required());
    assert!(d.default_value().is_none());
    assert!(d.validate(AttrValue::None).is_err());
}

#[test]
fn test_outputs_are_never_required() {
    let d = AttrDescriptor::clusters("clusters").output().required().no_default().unwrap();
    assert!(!d.is_required());
    assert!(d.direction().is_output());
    assert!(!d.direction().is_input());
}

#[test]
fn test_invalid_names() {
    assert_eq!(
        AttrDescriptor::string("").no_default().unwrap_err(),
        SchemaError::InvalidName(String::new())
    );
    assert!(matches!(
        AttrDescriptor::string("two words").no_default(),
        Err(SchemaError::InvalidName(_))
    ));
}

#[test]
fn test_schema_rejects_duplicates() {
    let err = AttrSchema::new(vec![
        AttrDescriptor::string("query").no_default().unwrap(),
        AttrDescriptor::integer("query").default_value(1).unwrap(),
    ])
    .unwrap_err();
    assert_eq!(err, SchemaError::DuplicateAttribute("query".into()));
}

#[test]
fn test_schema_views() {
    let schema = AttrSchema::new(vec![
        AttrDescriptor::string_array("fields").init().default_values("title", ["snippet"]).unwrap(),
        AttrDescriptor::string("query").no_default().unwrap(),
        AttrDescriptor::integer("total").in_out().default_value(0).unwrap(),
        AttrDescriptor::clusters("clusters").output().no_default().unwrap(),
    ])
    .unwrap();
    fn names<'a>(it: impl Iterator<Item = &'a AttrDescriptor>) -> Vec<&'a str> {
        it.map(AttrDescriptor::name).collect()
    }

    assert_eq!(names(schema.inputs(BindPhase::Init)), vec!["fields"]);
    assert_eq!(names(schema.inputs(BindPhase::Request)), vec!["query", "total"]);
    assert_eq!(names(schema.outputs()), vec!["total", "clusters"]);
    assert_eq!(names(schema.request_scoped()), vec!["query", "total", "clusters"]);
    assert!(schema.contains("fields"));
    assert!(schema.get("missing").is_none());
}
