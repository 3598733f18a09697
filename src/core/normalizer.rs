use std::path::Path;

use super::complexity;
use super::error::{Diagnostic, DiagnosticKind};
use super::{Entity, EntityDetails, EntityKind, Language};
use crate::parsers::RawEntity;

/// Maps raw scanner records onto the canonical [`Entity`] schema.
#[derive(Debug, Clone, Default)]
pub struct EntityNormalizer;

impl EntityNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one file's records, reporting any record that had to be dropped.
    pub fn normalize_file(
        &self,
        file_path: &Path,
        language: Language,
        raw_entities: Vec<RawEntity>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Entity> {
        let mut entities = Vec::with_capacity(raw_entities.len());
        for raw in raw_entities {
            match self.normalize(file_path, language, raw) {
                Some(entity) => entities.push(entity),
                None => diagnostics.push(Diagnostic {
                    file: file_path.to_path_buf(),
                    kind: DiagnosticKind::Dropped,
                    message: "record without a name".to_string(),
                }),
            }
        }
        entities
    }

    /// Returns `None` only for records with a blank name.
    pub fn normalize(&self, file_path: &Path, language: Language, raw: RawEntity) -> Option<Entity> {
        let name = raw.name.trim();
        if name.is_empty() {
            return None;
        }

        let details = match (raw.kind, raw.details) {
            (kind, details @ EntityDetails::Routine { .. }) if kind.is_routine() => details,
            (kind, _) if kind.is_routine() => EntityDetails::Routine {
                return_type: None,
                decorators: Vec::new(),
                variables: Vec::new(),
                is_async: false,
                complexity: 1,
            },
            (EntityKind::Class, details @ EntityDetails::Class { .. }) => details,
            (EntityKind::Class, _) => EntityDetails::Class {
                decorators: Vec::new(),
                bases: Vec::new(),
                methods: Vec::new(),
                class_attributes: Vec::new(),
                instance_attributes: Vec::new(),
            },
            (EntityKind::Walker | EntityKind::Node, details @ EntityDetails::Archetype { .. }) => {
                details
            }
            (EntityKind::Walker | EntityKind::Node, _) => EntityDetails::Archetype {
                attributes: Vec::new(),
                abilities: Vec::new(),
            },
            (EntityKind::Edge | EntityKind::Ability, _) => EntityDetails::Marker,
            // Routine kinds are exhausted by the guards above.
            (_, details) => details,
        };

        let mut entity = Entity {
            id: Entity::make_id(file_path, name),
            name: name.to_string(),
            kind: raw.kind,
            language,
            file_path: file_path.to_path_buf(),
            line_start: raw.line_start,
            line_end: raw.line_end.max(raw.line_start),
            docstring: raw.docstring.unwrap_or_default(),
            parameters: raw.parameters,
            dependencies: raw
                .dependencies
                .into_iter()
                .filter(|dep| !dep.is_empty())
                .collect(),
            details,
        };

        if let Some(points) = raw.decision_points {
            complexity::annotate(&mut entity, &points);
        }

        Some(entity)
    }
}
