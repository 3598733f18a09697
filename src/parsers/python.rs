use std::path::Path;
use tree_sitter::Node as TSNode;

use super::common::{
    clean_docstring, extract_text, find_child_by_kind, line_span, string_literal_value,
    TreeSitterParser,
};
use super::{LanguageParser, RawEntity};
use crate::core::complexity::DecisionPoints;
use crate::core::error::{ScanError, ScanResult};
use crate::core::{EntityDetails, EntityKind, Language, MethodDescriptor, Parameter};

/// Grammar-based scanner for Python sources.
///
/// Every function, method and class in the file becomes its own record,
/// nested definitions included. A definition's calls, assignments and decision
/// points are gathered from its own body only; nested definitions are skipped
/// and report their own.
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    /// Pre-order walk over the whole tree.
    fn collect_definitions(&self, root: &TSNode, source: &[u8], entities: &mut Vec<RawEntity>) {
        let mut stack = vec![*root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_definition" => {
                    if let Some(entity) = self.process_function(&node, source) {
                        entities.push(entity);
                    }
                }
                "class_definition" => {
                    if let Some(entity) = self.process_class(&node, source) {
                        entities.push(entity);
                    }
                }
                _ => {}
            }
            push_children(&node, &mut stack, false);
        }
    }

    fn process_function(&self, func_node: &TSNode, source: &[u8]) -> Option<RawEntity> {
        let name_node = func_node.child_by_field_name("name")?;
        let name = extract_text(&name_node, source);
        let (line_start, line_end) = line_span(func_node);

        let kind = if is_method(func_node) {
            EntityKind::Method
        } else {
            EntityKind::Function
        };

        let parameters = func_node
            .child_by_field_name("parameters")
            .map(|params| extract_parameters(&params, source))
            .unwrap_or_default();
        let return_type = func_node
            .child_by_field_name("return_type")
            .map(|node| extract_text(&node, source).to_string());
        let is_async = find_child_by_kind(func_node, "async").is_some();

        let body = func_node.child_by_field_name("body");
        let facts = body
            .as_ref()
            .map(|body| BodyFacts::scan(body, source))
            .unwrap_or_default();

        let mut entity = RawEntity::new(kind, name, line_start, line_end);
        entity.docstring = body.as_ref().and_then(|body| docstring(body, source));
        entity.parameters = parameters;
        entity.dependencies = facts.calls;
        entity.details = EntityDetails::Routine {
            return_type,
            decorators: decorators(func_node, source),
            variables: facts.variables,
            is_async,
            complexity: 1,
        };
        entity.decision_points = Some(facts.points);
        Some(entity)
    }

    fn process_class(&self, class_node: &TSNode, source: &[u8]) -> Option<RawEntity> {
        let name_node = class_node.child_by_field_name("name")?;
        let name = extract_text(&name_node, source);
        let (line_start, line_end) = line_span(class_node);

        let bases = class_node
            .child_by_field_name("superclasses")
            .map(|list| extract_bases(&list, source))
            .unwrap_or_default();

        let mut methods = Vec::new();
        let mut class_attributes = Vec::new();
        let mut instance_attributes = Vec::new();
        let body = class_node.child_by_field_name("body");

        if let Some(body) = &body {
            let mut cursor = body.walk();
            for item in body.named_children(&mut cursor) {
                match item.kind() {
                    "function_definition" => {
                        methods.push(method_descriptor(&item, source));
                        collect_self_attributes(&item, source, &mut instance_attributes);
                    }
                    "decorated_definition" => {
                        if let Some(def) = item.child_by_field_name("definition") {
                            if def.kind() == "function_definition" {
                                methods.push(method_descriptor(&def, source));
                                collect_self_attributes(&def, source, &mut instance_attributes);
                            }
                        }
                    }
                    "expression_statement" => {
                        let mut inner = item.walk();
                        for expr in item.named_children(&mut inner) {
                            if expr.kind() == "assignment" {
                                collect_class_attributes(&expr, source, &mut class_attributes);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut entity = RawEntity::new(EntityKind::Class, name, line_start, line_end);
        entity.docstring = body.as_ref().and_then(|body| docstring(body, source));
        entity.parameters = bases.iter().map(Parameter::new).collect();
        entity.dependencies = bases.clone();
        entity.details = EntityDetails::Class {
            decorators: decorators(class_node, source),
            bases,
            methods,
            class_attributes,
            instance_attributes,
        };
        Some(entity)
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for PythonParser {
    fn parse_source(&self, file_path: &Path, source: &str) -> ScanResult<Vec<RawEntity>> {
        let mut parser = TreeSitterParser::new(tree_sitter_python::language())
            .map_err(|err| ScanError::parse(file_path, err.to_string()))?;
        let tree = parser.parse_strict(file_path, source)?;

        let mut entities = Vec::new();
        self.collect_definitions(&tree.root_node(), source.as_bytes(), &mut entities);
        Ok(entities)
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

/// Calls, assignment targets and decision points of one definition body.
#[derive(Debug, Default)]
struct BodyFacts {
    calls: Vec<String>,
    variables: Vec<String>,
    points: DecisionPoints,
}

impl BodyFacts {
    fn scan(body: &TSNode, source: &[u8]) -> Self {
        let mut facts = Self::default();
        let mut stack = vec![*body];
        while let Some(node) = stack.pop() {
            if facts.visit(&node, source) {
                push_children(&node, &mut stack, false);
            }
        }
        facts
    }

    /// Record one node; returns whether its children belong to this body.
    fn visit(&mut self, node: &TSNode, source: &[u8]) -> bool {
        match node.kind() {
            "function_definition" | "class_definition" => return false,
            "if_statement" | "elif_clause" => self.points.branches += 1,
            "while_statement" | "for_statement" => self.points.loops += 1,
            "except_clause" | "except_group_clause" => self.points.handlers += 1,
            // `a and b and c` nests as two binary operators, one per extra operand.
            "boolean_operator" => self.points.boolean_operands += 1,
            "call" => {
                if let Some(target) = call_target(node, source) {
                    self.calls.push(target.to_string());
                }
            }
            "assignment" => {
                if node.child_by_field_name("right").is_some() {
                    if let Some(left) = node.child_by_field_name("left") {
                        collect_name_targets(&left, source, &mut self.variables);
                    }
                }
            }
            _ => {}
        }
        true
    }
}

/// Queue `node`'s children so they pop in source order. Operator chains nest
/// the tree without bound, so walks here keep their own stack.
fn push_children<'tree>(
    node: &TSNode<'tree>,
    stack: &mut Vec<TSNode<'tree>>,
    named_only: bool,
) {
    let mut cursor = node.walk();
    let children: Vec<TSNode<'tree>> = if named_only {
        node.named_children(&mut cursor).collect()
    } else {
        node.children(&mut cursor).collect()
    };
    stack.extend(children.into_iter().rev());
}

/// Terminal identifier of a direct-name or attribute-style call.
fn call_target<'a>(call: &TSNode, source: &'a [u8]) -> Option<&'a str> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(extract_text(&function, source)),
        "attribute" => function
            .child_by_field_name("attribute")
            .map(|attr| extract_text(&attr, source)),
        _ => None,
    }
}

/// Plain names bound by an assignment target, expanding tuple/list patterns.
fn collect_name_targets(target: &TSNode, source: &[u8], out: &mut Vec<String>) {
    let mut stack = vec![*target];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" => push_unique(out, extract_text(&node, source)),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
                push_children(&node, &mut stack, true);
            }
            _ => {}
        }
    }
}

fn collect_class_attributes(assignment: &TSNode, source: &[u8], out: &mut Vec<String>) {
    let mut current = Some(*assignment);
    while let Some(node) = current.filter(|node| node.kind() == "assignment") {
        let Some(right) = node.child_by_field_name("right") else {
            break;
        };
        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() == "identifier" {
                push_unique(out, extract_text(&left, source));
            }
        }
        current = Some(right);
    }
}

/// `self.<name> = ...` targets in a method's own body.
fn collect_self_attributes(method: &TSNode, source: &[u8], out: &mut Vec<String>) {
    let Some(body) = method.child_by_field_name("body") else {
        return;
    };

    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "function_definition" | "class_definition" => continue,
            "assignment" | "augmented_assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self_targets(&left, source, out);
                }
            }
            _ => {}
        }
        push_children(&node, &mut stack, false);
    }
}

fn self_targets(target: &TSNode, source: &[u8], out: &mut Vec<String>) {
    let mut stack = vec![*target];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "attribute" => {
                let object = node.child_by_field_name("object");
                let attribute = node.child_by_field_name("attribute");
                if let (Some(object), Some(attribute)) = (object, attribute) {
                    if object.kind() == "identifier" && extract_text(&object, source) == "self" {
                        push_unique(out, extract_text(&attribute, source));
                    }
                }
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" => {
                push_children(&node, &mut stack, true);
            }
            _ => {}
        }
    }
}

/// Regular positional parameters: those after a `/` separator and before the
/// first `*`/`*args` marker.
fn extract_parameters(params: &TSNode, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = params.walk();

    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => parameters.push(Parameter::new(extract_text(&child, source))),
            "typed_parameter" => {
                let Some(name) = child.named_child(0) else {
                    continue;
                };
                if name.kind() == "list_splat_pattern" {
                    break;
                }
                if name.kind() != "identifier" {
                    continue;
                }
                let annotation = child
                    .child_by_field_name("type")
                    .map(|ty| extract_text(&ty, source).to_string());
                parameters.push(Parameter {
                    name: extract_text(&name, source).to_string(),
                    type_annotation: annotation,
                });
            }
            "default_parameter" | "typed_default_parameter" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let annotation = child
                    .child_by_field_name("type")
                    .map(|ty| extract_text(&ty, source).to_string());
                parameters.push(Parameter {
                    name: extract_text(&name, source).to_string(),
                    type_annotation: annotation,
                });
            }
            "positional_separator" => parameters.clear(),
            "list_splat_pattern" | "keyword_separator" => break,
            _ => {}
        }
    }

    parameters
}

fn extract_bases(argument_list: &TSNode, source: &[u8]) -> Vec<String> {
    let mut bases = Vec::new();
    let mut cursor = argument_list.walk();
    for arg in argument_list.named_children(&mut cursor) {
        if matches!(arg.kind(), "identifier" | "attribute") {
            bases.push(extract_text(&arg, source).to_string());
        }
    }
    bases
}

/// Decorator expressions attached through an enclosing `decorated_definition`.
fn decorators(definition: &TSNode, source: &[u8]) -> Vec<String> {
    decorator_nodes(definition)
        .iter()
        .map(|expr| extract_text(expr, source).to_string())
        .collect()
}

fn decorator_nodes<'a>(definition: &TSNode<'a>) -> Vec<TSNode<'a>> {
    let Some(parent) = definition.parent() else {
        return Vec::new();
    };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }

    let mut cursor = parent.walk();
    let decorators: Vec<TSNode<'a>> = parent
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .filter_map(|decorator| decorator.named_child(0))
        .collect();
    decorators
}

fn method_descriptor(func_node: &TSNode, source: &[u8]) -> MethodDescriptor {
    let name = func_node
        .child_by_field_name("name")
        .map(|node| extract_text(&node, source).to_string())
        .unwrap_or_default();

    let plain_decorators: Vec<&str> = decorator_nodes(func_node)
        .iter()
        .filter(|expr| expr.kind() == "identifier")
        .map(|expr| extract_text(expr, source))
        .collect();

    MethodDescriptor {
        name,
        line: func_node.start_position().row + 1,
        is_static: plain_decorators.contains(&"staticmethod"),
        is_classmethod: plain_decorators.contains(&"classmethod"),
        is_property: plain_decorators.contains(&"property"),
    }
}

fn is_method(func_node: &TSNode) -> bool {
    let mut parent = func_node.parent();
    if parent.is_some_and(|node| node.kind() == "decorated_definition") {
        parent = parent.and_then(|node| node.parent());
    }
    match parent {
        Some(block) if block.kind() == "block" => block
            .parent()
            .is_some_and(|owner| owner.kind() == "class_definition"),
        _ => false,
    }
}

/// Leading string statement of a body, cleaned.
fn docstring(body: &TSNode, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    string_literal_value(extract_text(&literal, source)).map(|value| clean_docstring(&value))
}

fn push_unique(out: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !out.iter().any(|existing| existing == name) {
        out.push(name.to_string());
    }
}
