use ccg::core::{EntityDetails, EntityKind, Parameter};
use ccg::parsers::python::PythonParser;
use ccg::parsers::{LanguageParser, RawEntity};
use std::fs;
use std::path::Path;

fn scan(code: &str) -> Vec<RawEntity> {
    PythonParser::new()
        .parse_source(Path::new("sample.py"), code)
        .unwrap()
}

fn find<'a>(entities: &'a [RawEntity], name: &str) -> &'a RawEntity {
    entities
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no entity named {name}"))
}

#[test]
fn python_parser_extracts_functions_classes_and_methods() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("sample.py");
    let code = r#"
import os

class A(Base):
    """Doc for A"""
    def m(self, x):
        return helper(x)

def helper(v):
    return v
"#;
    fs::write(&file, code).unwrap();

    let entities = PythonParser::new().parse_file(&file).unwrap();
    let kinds: Vec<(&str, EntityKind)> = entities.iter().map(|e| (e.name.as_str(), e.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("A", EntityKind::Class),
            ("m", EntityKind::Method),
            ("helper", EntityKind::Function),
        ]
    );

    let class = find(&entities, "A");
    assert_eq!(class.docstring.as_deref(), Some("Doc for A"));
    assert_eq!(class.parameters, vec![Parameter::new("Base")]);
    assert_eq!(class.dependencies, vec!["Base".to_string()]);
    assert_eq!((class.line_start, class.line_end), (4, 7));

    let method = find(&entities, "m");
    assert_eq!(method.dependencies, vec!["helper".to_string()]);
}

#[test]
fn parameters_keep_annotations_and_stop_at_keyword_only_marker() {
    let entities = scan(
        "async def fetch(url: str, retries=3, timeout: float = 1.0, *args, key=None) -> bytes:\n    pass\n",
    );
    let fetch = find(&entities, "fetch");

    assert_eq!(
        fetch.parameters,
        vec![
            Parameter::typed("url", "str"),
            Parameter::new("retries"),
            Parameter::typed("timeout", "float"),
        ]
    );
    match &fetch.details {
        EntityDetails::Routine {
            return_type,
            is_async,
            ..
        } => {
            assert_eq!(return_type.as_deref(), Some("bytes"));
            assert!(*is_async);
        }
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn calls_include_attribute_terminals_but_not_nested_bodies() {
    let code = r#"
def outer():
    setup()
    self.client.send(payload)
    def inner():
        hidden()
    class Local:
        def method(self):
            also_hidden()
    return inner()
"#;
    let entities = scan(code);

    let outer = find(&entities, "outer");
    let mut deps = outer.dependencies.clone();
    deps.sort();
    assert_eq!(deps, vec!["inner", "send", "setup"]);

    assert_eq!(find(&entities, "inner").dependencies, vec!["hidden".to_string()]);
    assert_eq!(find(&entities, "method").kind, EntityKind::Method);
    assert_eq!(find(&entities, "Local").kind, EntityKind::Class);
}

#[test]
fn decision_points_are_counted_in_own_body_only() {
    let code = r#"
def branchy(a, b, c):
    while a:
        if a and b and c:
            pass
    def nested():
        if b:
            pass
"#;
    let entities = scan(code);
    let points = find(&entities, "branchy").decision_points.unwrap();
    assert_eq!(points.score(), 5);
    assert_eq!(find(&entities, "nested").decision_points.unwrap().score(), 2);
}

#[test]
fn variables_expand_destructuring_targets() {
    let code = r#"
def assign():
    a = 1
    b, (c, d) = pair()
    x = y = 0
    obj.attr = 2
    total += 1
    for item in items:
        z = item
"#;
    let entities = scan(code);
    match &find(&entities, "assign").details {
        EntityDetails::Routine { variables, .. } => {
            assert_eq!(variables, &vec!["a", "b", "c", "d", "x", "y", "z"]);
        }
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn class_details_capture_methods_and_attributes() {
    let code = r#"
@dataclass
class Dog(Animal, mixins.Loud):
    species = "canine"

    def __init__(self, name):
        self.name = name
        self.tricks = []

    @staticmethod
    def create():
        return Dog("rex")

    @classmethod
    def from_dict(cls, data):
        return cls(data["name"])

    @property
    def label(self):
        return self.name
"#;
    let entities = scan(code);
    let dog = find(&entities, "Dog");

    match &dog.details {
        EntityDetails::Class {
            decorators,
            bases,
            methods,
            class_attributes,
            instance_attributes,
        } => {
            assert_eq!(decorators, &vec!["dataclass"]);
            assert_eq!(bases, &vec!["Animal", "mixins.Loud"]);
            assert_eq!(class_attributes, &vec!["species"]);
            assert_eq!(instance_attributes, &vec!["name", "tricks"]);

            let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["__init__", "create", "from_dict", "label"]);
            assert!(methods[1].is_static);
            assert!(methods[2].is_classmethod);
            assert!(methods[3].is_property);
            assert!(!methods[0].is_static && !methods[0].is_property);
        }
        other => panic!("unexpected details {other:?}"),
    }

    let create = find(&entities, "create");
    assert_eq!(create.kind, EntityKind::Method);
    match &create.details {
        EntityDetails::Routine { decorators, .. } => assert_eq!(decorators, &vec!["staticmethod"]),
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn docstrings_are_dedented() {
    let code = "def documented():\n    \"\"\"Summary.\n\n    Longer text.\n    \"\"\"\n    return 1\n";
    let entities = scan(code);
    assert_eq!(
        find(&entities, "documented").docstring.as_deref(),
        Some("Summary.\n\nLonger text.")
    );
}

#[test]
fn syntax_errors_are_reported_as_parse_errors() {
    let err = PythonParser::new()
        .parse_source(Path::new("broken.py"), "def broken(:\n    return\n")
        .unwrap_err();
    assert!(matches!(err, ccg::core::ScanError::Parse { .. }));
}

#[test]
fn deeply_nested_expressions_do_not_exhaust_the_stack() {
    let mut code = String::from("def big():\n    return a");
    code.push_str(&" + a".repeat(10_000));
    code.push_str("\n\ndef small():\n    return helper()\n");

    let entities = scan(&code);
    let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["big", "small"]);
    assert!(find(&entities, "big").dependencies.is_empty());
    assert_eq!(find(&entities, "small").dependencies, vec!["helper"]);
}

#[test]
fn positional_only_parameters_are_skipped() {
    let entities = scan("def f(a, b, /, c, d: int = 1, *, e):\n    pass\n");
    assert_eq!(
        find(&entities, "f").parameters,
        vec![Parameter::new("c"), Parameter::typed("d", "int")]
    );
}

#[test]
fn docstring_escapes_are_decoded() {
    let code = "def quoted():\n    \"\"\"Say \\\"hi\\\"\\tnow.\"\"\"\n    return 1\n\ndef raw():\n    r\"\"\"Keep \\t here.\"\"\"\n";
    let entities = scan(code);
    assert_eq!(
        find(&entities, "quoted").docstring.as_deref(),
        Some("Say \"hi\"        now.")
    );
    assert_eq!(find(&entities, "raw").docstring.as_deref(), Some("Keep \\t here."));
}
