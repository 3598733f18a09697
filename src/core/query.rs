use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipFilter {
    Calls,
    CalledBy,
    Inherits,
    All,
}

impl RelationshipFilter {
    fn includes(self, other: RelationshipFilter) -> bool {
        self == RelationshipFilter::All || self == other
    }
}

impl FromStr for RelationshipFilter {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "calls" => Ok(RelationshipFilter::Calls),
            "called_by" => Ok(RelationshipFilter::CalledBy),
            "inherits" => Ok(RelationshipFilter::Inherits),
            "all" => Ok(RelationshipFilter::All),
            other => anyhow::bail!(
                "unknown relationship '{other}' (expected calls, called_by, inherits or all)"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Calls,
    CalledBy,
    InheritsFrom,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Relationship::Calls => "calls",
            Relationship::CalledBy => "called_by",
            Relationship::InheritsFrom => "inherits_from",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RelatedEntity {
    pub entity_name: String,
    pub kind: EntityKind,
    pub relationship: Relationship,
    pub file: PathBuf,
}

impl RelatedEntity {
    fn new(entity: &Entity, relationship: Relationship) -> Self {
        Self {
            entity_name: entity.name.clone(),
            kind: entity.kind,
            relationship,
            file: entity.file_path.clone(),
        }
    }
}

/// Relationship lookups over the full entity list.
///
/// A subject name resolves to the first entity with that name in iteration
/// order; later entities sharing the name are never used as the subject.
pub struct QueryEngine<'a> {
    entities: &'a [Entity],
}

impl<'a> QueryEngine<'a> {
    pub fn new(entities: &'a [Entity]) -> Self {
        Self { entities }
    }

    pub fn subject(&self, name: &str) -> Option<&'a Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Unknown subjects yield an empty list.
    pub fn related(&self, name: &str, filter: RelationshipFilter) -> Vec<RelatedEntity> {
        let Some(subject) = self.subject(name) else {
            return Vec::new();
        };

        let mut related = Vec::new();

        if filter.includes(RelationshipFilter::Calls) {
            related.extend(self.callees(subject));
        }
        if filter.includes(RelationshipFilter::CalledBy) {
            related.extend(self.callers(subject));
        }
        if filter.includes(RelationshipFilter::Inherits) && subject.kind == EntityKind::Class {
            related.extend(self.supertypes(subject));
        }

        related
    }

    fn callees(&self, subject: &Entity) -> Vec<RelatedEntity> {
        subject
            .dependencies
            .iter()
            .flat_map(|dependency| self.named(dependency))
            .map(|entity| RelatedEntity::new(entity, Relationship::Calls))
            .collect()
    }

    fn callers(&self, subject: &Entity) -> Vec<RelatedEntity> {
        self.entities
            .iter()
            .filter(|entity| entity.dependencies.contains(&subject.name))
            .map(|entity| RelatedEntity::new(entity, Relationship::CalledBy))
            .collect()
    }

    fn supertypes(&self, subject: &Entity) -> Vec<RelatedEntity> {
        subject
            .bases()
            .iter()
            .flat_map(|base| self.named(base))
            .map(|entity| RelatedEntity::new(entity, Relationship::InheritsFrom))
            .collect()
    }

    fn named<'n>(&self, name: &'n str) -> impl Iterator<Item = &'a Entity> + 'n
    where
        'a: 'n,
    {
        let entities: &'a [Entity] = self.entities;
        entities.iter().filter(move |entity| entity.name == name)
    }
}
