use ccg::core::{
    EdgeType, Entity, EntityDetails, EntityKind, GraphBuilder, Language, Parameter,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

fn function(file: &str, name: &str, deps: &[&str]) -> Entity {
    Entity {
        id: format!("{file}::{name}"),
        name: name.to_string(),
        kind: EntityKind::Function,
        language: Language::Python,
        file_path: PathBuf::from(file),
        line_start: 1,
        line_end: 2,
        docstring: String::new(),
        parameters: Vec::new(),
        dependencies: deps.iter().map(|d| d.to_string()).collect::<BTreeSet<_>>(),
        details: EntityDetails::Routine {
            return_type: None,
            decorators: Vec::new(),
            variables: Vec::new(),
            is_async: false,
            complexity: 1,
        },
    }
}

fn class(file: &str, name: &str, bases: &[&str]) -> Entity {
    Entity {
        id: format!("{file}::{name}"),
        name: name.to_string(),
        kind: EntityKind::Class,
        language: Language::Python,
        file_path: PathBuf::from(file),
        line_start: 1,
        line_end: 5,
        docstring: String::new(),
        parameters: bases.iter().map(|b| Parameter::new(*b)).collect(),
        dependencies: bases.iter().map(|b| b.to_string()).collect(),
        details: EntityDetails::Class {
            decorators: Vec::new(),
            bases: bases.iter().map(|b| b.to_string()).collect(),
            methods: Vec::new(),
            class_attributes: Vec::new(),
            instance_attributes: Vec::new(),
        },
    }
}

#[test]
fn dependency_matching_several_files_emits_one_edge_per_match() {
    let entities = vec![
        function("a.py", "helper", &[]),
        function("b.py", "helper", &[]),
        function("main.py", "main", &["helper"]),
    ];
    let graph = GraphBuilder::from_entities(&entities);

    let calls: Vec<(&str, &str)> = graph
        .edges_of_kind(EdgeType::Calls)
        .map(|e| (e.source_id.as_str(), e.target_id.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![("main.py::main", "a.py::helper"), ("main.py::main", "b.py::helper")]
    );
    assert_eq!(graph.metadata.total_nodes, 3);
    assert_eq!(graph.metadata.total_edges, 2);
    assert_eq!(graph.metadata.languages, vec![Language::Python]);
}

#[test]
fn class_base_in_other_file_yields_inherits_edge() {
    let entities = vec![class("dog.py", "Dog", &["Animal"]), class("animal.py", "Animal", &[])];
    let graph = GraphBuilder::from_entities(&entities);

    let inherits: Vec<_> = graph.edges_of_kind(EdgeType::Inherits).collect();
    assert_eq!(inherits.len(), 1);
    assert_eq!(inherits[0].source_id, "dog.py::Dog");
    assert_eq!(inherits[0].target_id, "animal.py::Animal");
    assert_eq!(inherits[0].label, "inherits from");
}

#[test]
fn edges_are_not_deduplicated_and_follow_entity_order() {
    let entities = vec![
        function("x.py", "dup", &[]),
        function("x.py", "dup", &[]),
        function("x.py", "first", &["dup", "later"]),
        function("x.py", "later", &["dup"]),
    ];
    let graph = GraphBuilder::from_entities(&entities);

    let edges: Vec<(&str, &str)> = graph
        .edges()
        .map(|e| (e.source_id.as_str(), e.target_id.as_str()))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("x.py::first", "x.py::dup"),
            ("x.py::first", "x.py::dup"),
            ("x.py::first", "x.py::later"),
            ("x.py::later", "x.py::dup"),
            ("x.py::later", "x.py::dup"),
        ]
    );
}

#[test]
fn calls_edge_count_matches_name_match_multiplicity() {
    let entities = vec![
        function("a.py", "f", &["g", "h", "missing"]),
        function("a.py", "g", &["f"]),
        function("b.py", "g", &["h"]),
        function("b.py", "h", &[]),
    ];
    let graph = GraphBuilder::from_entities(&entities);

    let expected: usize = entities
        .iter()
        .enumerate()
        .map(|(i, e)| {
            e.dependencies
                .iter()
                .map(|d| {
                    entities
                        .iter()
                        .enumerate()
                        .filter(|(j, t)| *j != i && &t.name == d)
                        .count()
                })
                .sum::<usize>()
        })
        .sum();
    assert_eq!(expected, 5);
    assert_eq!(graph.edges_of_kind(EdgeType::Calls).count(), expected);
}

#[test]
fn self_reference_does_not_produce_an_edge() {
    let entities = vec![function("r.py", "recurse", &["recurse"])];
    let graph = GraphBuilder::from_entities(&entities);
    assert_eq!(graph.metadata.total_edges, 0);
}

#[test]
fn empty_entity_set_builds_empty_graph() {
    let graph = GraphBuilder::from_entities(&[]);
    assert_eq!(graph.metadata.total_nodes, 0);
    assert_eq!(graph.metadata.total_edges, 0);
    assert!(graph.metadata.languages.is_empty());
}

#[test]
fn graph_nodes_truncate_docstrings() {
    let mut entity = function("d.py", "documented", &[]);
    entity.docstring = "x".repeat(250);
    let graph = GraphBuilder::from_entities(&[entity]);
    let node = graph.nodes().next().unwrap();
    assert_eq!(node.docstring.len(), 100);
    assert_eq!(node.id, "d.py::documented");
}
