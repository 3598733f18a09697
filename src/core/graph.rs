use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::{Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use super::{Entity, EntityKind, Language, Parameter};

/// Characters of docstring carried on a graph node.
const DOCSTRING_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Calls,
    Inherits,
}

impl EdgeType {
    pub fn label(self) -> &'static str {
        match self {
            EdgeType::Calls => "calls",
            EdgeType::Inherits => "inherits from",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub language: Language,
    pub file_path: PathBuf,
    pub line: usize,
    pub docstring: String,
    pub parameters: Vec<Parameter>,
}

impl GraphNode {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            kind: entity.kind,
            language: entity.language,
            file_path: entity.file_path.clone(),
            line: entity.line_start,
            docstring: entity.docstring.chars().take(DOCSTRING_PREVIEW_CHARS).collect(),
            parameters: entity.parameters.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeType,
    pub label: String,
}

impl GraphEdge {
    pub fn new(kind: EdgeType, source_id: String, target_id: String) -> Self {
        Self {
            source_id,
            target_id,
            kind,
            label: kind.label().to_string(),
        }
    }
}

pub type DependencyGraph = Graph<GraphNode, GraphEdge, Directed>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub languages: Vec<Language>,
}

/// Assembled code context graph. Node and edge order is insertion order.
#[derive(Debug, Clone)]
pub struct CodeGraph {
    pub graph: DependencyGraph,
    pub metadata: GraphMetadata,
}

impl CodeGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.raw_edges().iter().map(|edge| &edge.weight)
    }

    pub fn edges_of_kind(&self, kind: EdgeType) -> impl Iterator<Item = &GraphEdge> {
        self.edges().filter(move |edge| edge.kind == kind)
    }
}

/// Builds the graph with name-only resolution: a dependency `d` of entity `E`
/// yields one `Calls` edge to every other entity named `d`, in any file, and a
/// class base yields one `Inherits` edge to every other entity with that name.
/// Edges are emitted in entity order, then dependency/base order, and are
/// never deduplicated.
pub struct GraphBuilder {
    graph: DependencyGraph,
    node_indices: Vec<NodeIndex>,
    languages: BTreeSet<Language>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_indices: Vec::new(),
            languages: BTreeSet::new(),
        }
    }

    pub fn from_entities(entities: &[Entity]) -> CodeGraph {
        let mut builder = Self::new();
        for entity in entities {
            builder.add_node(entity);
        }
        builder.link(entities);
        builder.build()
    }

    fn add_node(&mut self, entity: &Entity) -> NodeIndex {
        self.languages.insert(entity.language);
        let index = self.graph.add_node(GraphNode::from_entity(entity));
        self.node_indices.push(index);
        index
    }

    /// Resolve dependencies and bases of `entities`, which must be the same
    /// slice, in the same order, that was passed to [`add_node`](Self::add_node).
    fn link(&mut self, entities: &[Entity]) {
        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::with_capacity(entities.len());
        for (position, entity) in entities.iter().enumerate() {
            by_name.entry(entity.name.as_str()).or_default().push(position);
        }

        for (source, entity) in entities.iter().enumerate() {
            for dependency in &entity.dependencies {
                let targets = by_name.get(dependency.as_str());
                self.link_matches(entities, source, targets, EdgeType::Calls);
            }

            if entity.kind == EntityKind::Class {
                for base in entity.bases() {
                    let targets = by_name.get(base.as_str());
                    self.link_matches(entities, source, targets, EdgeType::Inherits);
                }
            }
        }
    }

    fn link_matches(
        &mut self,
        entities: &[Entity],
        source: usize,
        targets: Option<&Vec<usize>>,
        kind: EdgeType,
    ) {
        let Some(targets) = targets else {
            return;
        };
        for &target in targets.iter().filter(|&&target| target != source) {
            let edge = GraphEdge::new(
                kind,
                entities[source].id.clone(),
                entities[target].id.clone(),
            );
            self.add_edge(source, target, edge);
        }
    }

    /// Add an edge between the `source`-th and `target`-th added nodes.
    fn add_edge(
        &mut self,
        source: usize,
        target: usize,
        edge: GraphEdge,
    ) -> Option<EdgeIndex> {
        let source_idx = self.node_indices.get(source)?;
        let target_idx = self.node_indices.get(target)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, edge))
    }

    fn build(self) -> CodeGraph {
        let metadata = GraphMetadata {
            total_nodes: self.graph.node_count(),
            total_edges: self.graph.edge_count(),
            languages: self.languages.into_iter().collect(),
        };
        CodeGraph {
            graph: self.graph,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityDetails, EntityKind};
    use std::collections::BTreeSet;
    use std::path::Path;

    fn function(name: &str) -> Entity {
        Entity {
            id: Entity::make_id(Path::new("a.py"), name),
            name: name.to_string(),
            kind: EntityKind::Function,
            language: Language::Python,
            file_path: PathBuf::from("a.py"),
            line_start: 1,
            line_end: 2,
            docstring: String::new(),
            parameters: Vec::new(),
            dependencies: BTreeSet::new(),
            details: EntityDetails::Marker,
        }
    }

    #[test]
    fn add_edge_rejects_positions_without_nodes() {
        let entity = function("solo");
        let mut builder = GraphBuilder::new();
        builder.add_node(&entity);

        let edge = GraphEdge::new(EdgeType::Calls, entity.id.clone(), "missing".to_string());
        assert!(builder.add_edge(0, 1, edge).is_none());
        assert_eq!(builder.build().metadata.total_edges, 0);
    }
}
