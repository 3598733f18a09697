use anyhow::Result;
use petgraph::visit::EdgeRef;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::{AnalysisReport, CodeGraph, EdgeType, EntityKind, RelatedEntity};

/// JSON writer for the produced graph and entity set.
///
/// The minimal form interns file paths and shortens keys for token-sensitive
/// consumers; the full form carries every field plus entities, stats and
/// diagnostics for downstream documentation tooling.
pub struct JsonCompactFormatter {
    minimal: bool,
    pretty: bool,
}

impl JsonCompactFormatter {
    pub fn new() -> Self {
        Self {
            minimal: false,
            pretty: false,
        }
    }

    pub fn with_minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_to_file(&self, report: &AnalysisReport, output_path: &Path) -> Result<()> {
        let json_content = self.format_report(report)?;
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let output = if self.minimal {
            self.compact_graph(&report.graph)
        } else {
            json!({
                "metadata": report.graph.metadata,
                "nodes": report.graph.nodes().collect::<Vec<_>>(),
                "edges": report.graph.edges().collect::<Vec<_>>(),
                "entities": report.entities,
                "stats": report.stats,
                "diagnostics": report.diagnostics,
            })
        };
        self.render(&output)
    }

    pub fn format_related(&self, related: &[RelatedEntity]) -> Result<String> {
        self.render(&serde_json::to_value(related)?)
    }

    fn render(&self, value: &Value) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }

    fn compact_graph(&self, code_graph: &CodeGraph) -> Value {
        let graph = &code_graph.graph;
        let mut files: Vec<String> = Vec::new();
        let mut file_ids: HashMap<String, usize> = HashMap::new();

        let nodes: Vec<Value> = graph
            .node_indices()
            .map(|idx| {
                let node = &graph[idx];
                let path = node.file_path.to_string_lossy().to_string();
                let file_id = *file_ids.entry(path.clone()).or_insert_with(|| {
                    files.push(path);
                    files.len() - 1
                });
                json!({
                    "n": node.name,
                    "t": self.kind_code(node.kind),
                    "f": file_id,
                    "l": node.line
                })
            })
            .collect();

        let edges: Vec<Value> = graph
            .edge_references()
            .map(|edge_ref| {
                json!([
                    edge_ref.source().index(),
                    edge_ref.target().index(),
                    self.edge_code(edge_ref.weight().kind)
                ])
            })
            .collect();

        json!({
            "meta": {
                "nodes": code_graph.metadata.total_nodes,
                "edges": code_graph.metadata.total_edges,
                "languages": code_graph.metadata.languages,
                "format": "compact"
            },
            "files": files,
            "nodes": nodes,
            "edges": edges
        })
    }

    fn kind_code(&self, kind: EntityKind) -> u8 {
        match kind {
            EntityKind::Function => 0,
            EntityKind::Class => 1,
            EntityKind::Method => 2,
            EntityKind::Walker => 3,
            EntityKind::Node => 4,
            EntityKind::Edge => 5,
            EntityKind::Ability => 6,
        }
    }

    fn edge_code(&self, edge_type: EdgeType) -> u8 {
        match edge_type {
            EdgeType::Calls => 1,
            EdgeType::Inherits => 2,
        }
    }
}

impl Default for JsonCompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}
