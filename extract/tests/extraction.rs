//! Integration tests: definition documents → schema → argument vector → clap.

use std::path::{Path, PathBuf};

use argform_core::{
    ArgumentKind, FieldKey, FieldValue, FormState, SchemaError, SemanticType, SerializeError,
    TypedValue, ValueTransformer, serialize, validate_schema,
};
use argform_extract::{
    DefinitionDocument, DefinitionSource, ParseEntry, SchemaSource, TransformerRegistry,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn registry() -> TransformerRegistry {
    let mut registry = TransformerRegistry::new();
    registry.register(
        "positive_int",
        ValueTransformer::returning(SemanticType::Integer, |raw| {
            let n: i64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("`{raw}` is not an integer"))?;
            if n < 1 {
                return Err(format!("thread count must be at least 1, got {n}"));
            }
            Ok(TypedValue::Integer(n))
        }),
    );
    registry
}

fn load(name: &str) -> DefinitionSource {
    DefinitionSource::from_path(&fixture(name), &registry())
        .unwrap_or_else(|e| panic!("failed to load {name}: {e}"))
}

#[test]
fn test_graph_schema_kinds() {
    let schema = load("graph.yaml").extract().unwrap();
    assert!(validate_schema(&schema).is_empty());

    let kinds: Vec<(&str, ArgumentKind)> = schema
        .arguments
        .iter()
        .map(|a| (a.name.as_str(), a.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("infile", ArgumentKind::FilePath),
            ("outfile", ArgumentKind::Value),
            ("loglevel", ArgumentKind::Choice),
            ("seed", ArgumentKind::Value),
            ("logfile", ArgumentKind::FilePath),
            ("all_signal", ArgumentKind::Flag),
            ("verbose", ArgumentKind::Counting),
            ("tag", ArgumentKind::AppendList),
            ("thread", ArgumentKind::CustomTyped),
            ("version", ArgumentKind::Display),
        ]
    );
}

#[test]
fn test_round_trip_defaults_match_parser_defaults() {
    let source = load("graph.yaml");
    let schema = source.extract().unwrap();
    let state = FormState::from_defaults(&schema);

    let argv = serialize(&schema, None, &state).unwrap();
    assert_eq!(argv, vec!["graph.dat", "--seed", "0", "--thread", "1"]);

    let from_form = source.parse_tokens(&argv).unwrap();
    let from_nothing = source.parse_tokens(&[]).unwrap();

    for id in ["infile", "outfile", "loglevel", "thread"] {
        assert_eq!(
            from_form.get_one::<String>(id),
            from_nothing.get_one::<String>(id),
            "value of {id} differs"
        );
    }
    assert_eq!(from_form.get_one::<i64>("seed"), from_nothing.get_one::<i64>("seed"));
    assert_eq!(
        from_form.get_one::<PathBuf>("logfile"),
        from_nothing.get_one::<PathBuf>("logfile")
    );
    assert_eq!(from_form.get_flag("all_signal"), from_nothing.get_flag("all_signal"));
    assert_eq!(from_form.get_count("verbose"), from_nothing.get_count("verbose"));
}

#[test]
fn test_counting_and_append_laws() {
    let source = load("graph.yaml");
    let schema = source.extract().unwrap();
    let mut state = FormState::from_defaults(&schema);
    state.set(FieldKey::global("verbose"), FieldValue::Count(3));
    state.set(FieldKey::global("tag"), FieldValue::text("a b  c"));
    state.set(FieldKey::global("all_signal"), FieldValue::Bool(true));

    let argv = serialize(&schema, None, &state).unwrap();
    assert_eq!(argv.iter().filter(|t| *t == "--verbose").count(), 3);

    let matches = source.parse_tokens(&argv).unwrap();
    assert_eq!(matches.get_count("verbose"), 3);
    assert!(matches.get_flag("all_signal"));
    let tags: Vec<&String> = matches.get_many::<String>("tag").unwrap().collect();
    assert_eq!(tags, vec!["a", "b", "c"]);
}

#[test]
fn test_custom_typed_rejection_names_field() {
    let schema = load("graph.yaml").extract().unwrap();
    let mut state = FormState::from_defaults(&schema);
    state.set(FieldKey::global("thread"), FieldValue::text("0"));

    let err = serialize(&schema, None, &state).unwrap_err();
    assert!(matches!(err, SerializeError::ValueTransform { ref field, .. } if field.name == "thread"));
    assert_eq!(err.field(), Some(&FieldKey::global("thread")));
}

#[test]
fn test_display_text_is_captured_without_exit() {
    let source = load("graph.yaml");
    assert_eq!(source.capture_display("--version").as_deref(), Some("graph 2.0"));
}

#[test]
fn test_subcommand_law() {
    let source = load("subparsers.json");
    let schema = source.extract().unwrap();
    assert_eq!(schema.group_names(), vec!["sub1", "sub2"]);
    assert_eq!(
        schema.subcommands[1].own_arguments[1].kind,
        ArgumentKind::DirectoryPath
    );

    let mut state = FormState::from_defaults(&schema);
    state.set(FieldKey::scoped("sub1", "sub1_arg"), FieldValue::text("x"));
    state.set(FieldKey::global("verbose"), FieldValue::Bool(true));

    let argv = serialize(&schema, Some("sub1"), &state).unwrap();
    assert_eq!(argv, vec!["sub1", "x", "--verbose"]);

    let matches = source.parse_tokens(&argv).unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "sub1");
    assert_eq!(sub.get_one::<String>("sub1_arg").map(String::as_str), Some("x"));
    assert!(sub.get_flag("verbose"));
}

#[test]
fn test_rejections() {
    let err = DefinitionSource::from_path(&fixture("nested.yaml"), &registry()).unwrap_err();
    assert!(matches!(err, SchemaError::NestedSubcommands { .. }));

    let err = DefinitionSource::from_path(&fixture("foreign.yaml"), &registry()).unwrap_err();
    assert!(matches!(err, SchemaError::UnsupportedParser(_)));

    let err = DefinitionSource::from_path(&fixture("graph.yaml"), &TransformerRegistry::new())
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnknownValueType { ref name, .. } if name == "positive_int"));

    let err = DefinitionSource::from_path(Path::new("/nonexistent/x.json"), &registry()).unwrap_err();
    assert!(matches!(err, SchemaError::Io(_)));
}

#[test]
fn test_json_and_yaml_documents_agree() {
    let dir = tempfile::tempdir().unwrap();
    let document = DefinitionDocument::load(&fixture("subparsers.json")).unwrap();
    let yaml_path = dir.path().join("subparsers.yml");
    std::fs::write(&yaml_path, serde_yaml::to_string(&document).unwrap()).unwrap();

    let from_json = load("subparsers.json").extract().unwrap();
    let from_yaml = DefinitionSource::from_path(&yaml_path, &registry())
        .unwrap()
        .extract()
        .unwrap();
    assert_eq!(
        serde_json::to_value(&from_json).unwrap(),
        serde_json::to_value(&from_yaml).unwrap()
    );
}

#[test]
fn test_negative_numbers_parse_back() {
    let yaml = r#"
program: shift
arguments:
  - flags: ["--seed"]
    type: int
    default: 0
  - flags: ["--offset"]
    type: signed
"#;
    let mut registry = TransformerRegistry::new();
    registry.register(
        "signed",
        ValueTransformer::returning(SemanticType::Integer, |raw| {
            raw.trim()
                .parse()
                .map(TypedValue::Integer)
                .map_err(|_| format!("`{raw}` is not an integer"))
        }),
    );
    let document = DefinitionDocument::from_yaml(yaml).unwrap();
    let source = DefinitionSource::new(document, &registry).unwrap();
    let schema = source.extract().unwrap();

    let mut state = FormState::from_defaults(&schema);
    state.set(FieldKey::global("seed"), FieldValue::Count(-5));
    state.set(FieldKey::global("offset"), FieldValue::text("-42"));
    let argv = serialize(&schema, None, &state).unwrap();
    assert_eq!(argv, vec!["--seed", "-5", "--offset", "-42"]);

    let matches = source.parse_tokens(&argv).unwrap();
    assert_eq!(matches.get_one::<i64>("seed"), Some(&-5));
    assert_eq!(
        matches.get_one::<String>("offset").map(String::as_str),
        Some("-42")
    );
}
