use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::{LanguageParser, RawEntity};
use crate::core::error::ScanResult;
use crate::core::{EntityDetails, EntityKind, Language, Parameter};

/// Lines attributed to a standalone `can ... with` ability.
const ABILITY_SPAN_LINES: usize = 5;

static WALKER_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"walker\s+(\w+)\s*\{([^}]*)\}").expect("walker pattern"));
static NODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"node\s+(\w+)\s*\{([^}]*)\}").expect("node pattern"));
static EDGE_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"edge\s+(\w+)").expect("edge pattern"));
static ABILITY_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"can\s+(\w+)\s+with").expect("ability pattern"));
static HAS_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"has\s+(\w+)\s*:\s*(\w+)").expect("has pattern"));
static CAN_ABILITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"can\s+(\w+)").expect("can pattern"));
static BLOCK_DOCSTRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^\s*"""(.*?)""""#).expect("docstring pattern"));

/// Pattern-based scanner for Jac sources.
///
/// Walker and node blocks extend to the first closing brace; nested blocks are
/// not followed. `has` attributes and `can` abilities are matched only inside
/// their block's body. The `regex` engine runs in linear time, so a long or
/// unterminated block cannot trigger runaway backtracking.
pub struct JacParser;

impl JacParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_archetypes(
        &self,
        content: &str,
        pattern: &Regex,
        kind: EntityKind,
        entities: &mut Vec<RawEntity>,
    ) {
        for captures in pattern.captures_iter(content) {
            let (Some(block), Some(name), Some(body)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };

            let attributes: Vec<Parameter> = HAS_ATTRIBUTE
                .captures_iter(body.as_str())
                .map(|attr| Parameter::typed(&attr[1], &attr[2]))
                .collect();
            // Only walkers declare abilities that become dependencies.
            let abilities: Vec<String> = if kind == EntityKind::Walker {
                CAN_ABILITY
                    .captures_iter(body.as_str())
                    .map(|ability| ability[1].to_string())
                    .collect()
            } else {
                Vec::new()
            };

            let mut entity = RawEntity::new(
                kind,
                name.as_str(),
                line_at(content, block.start()),
                line_at(content, block.end()),
            );
            entity.docstring = block_docstring(body.as_str());
            entity.parameters = attributes.clone();
            entity.dependencies = abilities.clone();
            entity.details = EntityDetails::Archetype {
                attributes,
                abilities,
            };
            entities.push(entity);
        }
    }

    fn extract_edges(&self, content: &str, entities: &mut Vec<RawEntity>) {
        for captures in EDGE_DECL.captures_iter(content) {
            let (Some(decl), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let line = line_at(content, decl.start());
            entities.push(RawEntity::new(EntityKind::Edge, name.as_str(), line, line));
        }
    }

    fn extract_abilities(&self, content: &str, entities: &mut Vec<RawEntity>) {
        for captures in ABILITY_DECL.captures_iter(content) {
            let (Some(decl), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let line = line_at(content, decl.start());
            entities.push(RawEntity::new(
                EntityKind::Ability,
                name.as_str(),
                line,
                line + ABILITY_SPAN_LINES,
            ));
        }
    }
}

impl Default for JacParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for JacParser {
    fn parse_source(&self, _file_path: &Path, source: &str) -> ScanResult<Vec<RawEntity>> {
        let mut entities = Vec::new();
        self.extract_archetypes(source, &WALKER_BLOCK, EntityKind::Walker, &mut entities);
        self.extract_archetypes(source, &NODE_BLOCK, EntityKind::Node, &mut entities);
        self.extract_edges(source, &mut entities);
        self.extract_abilities(source, &mut entities);
        Ok(entities)
    }

    fn language(&self) -> Language {
        Language::Jac
    }
}

/// 1-based line containing byte `offset`.
fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

fn block_docstring(body: &str) -> Option<String> {
    BLOCK_DOCSTRING
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|doc| doc.as_str().trim().to_string())
}
