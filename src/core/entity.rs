use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Source languages with a registered scanner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Jac,
}

impl Language {
    /// Resolve a language tag as supplied by the repository mapper.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "jac" => Some(Language::Jac),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "py" | "pyi" | "pyw" => Some(Language::Python),
            "jac" => Some(Language::Jac),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Jac => "jac",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
    Method,
    Walker,
    Node,
    Edge,
    Ability,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Class => "class",
            EntityKind::Method => "method",
            EntityKind::Walker => "walker",
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Ability => "ability",
        }
    }

    pub fn is_routine(self) -> bool {
        matches!(self, EntityKind::Function | EntityKind::Method)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter, a base class, or a declared `has` attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation: Some(type_annotation.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub line: usize,
    pub is_static: bool,
    pub is_classmethod: bool,
    pub is_property: bool,
}

/// Kind-specific attributes of an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EntityDetails {
    /// Functions and methods.
    Routine {
        return_type: Option<String>,
        decorators: Vec<String>,
        variables: Vec<String>,
        is_async: bool,
        complexity: u32,
    },
    Class {
        decorators: Vec<String>,
        bases: Vec<String>,
        methods: Vec<MethodDescriptor>,
        class_attributes: Vec<String>,
        instance_attributes: Vec<String>,
    },
    /// Jac walkers and nodes.
    Archetype {
        attributes: Vec<Parameter>,
        abilities: Vec<String>,
    },
    /// Jac edges and standalone abilities carry nothing beyond the common fields.
    Marker,
}

impl EntityDetails {
    pub fn complexity(&self) -> Option<u32> {
        match self {
            EntityDetails::Routine { complexity, .. } => Some(*complexity),
            _ => None,
        }
    }

    pub fn bases(&self) -> &[String] {
        match self {
            EntityDetails::Class { bases, .. } => bases,
            _ => &[],
        }
    }

    pub fn declared_methods(&self) -> usize {
        match self {
            EntityDetails::Class { methods, .. } => methods.len(),
            _ => 0,
        }
    }
}

/// Canonical record of one analyzed construct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub language: Language,
    pub file_path: PathBuf,
    pub line_start: usize,
    pub line_end: usize,
    pub docstring: String,
    pub parameters: Vec<Parameter>,
    pub dependencies: BTreeSet<String>,
    pub details: EntityDetails,
}

impl Entity {
    pub fn make_id(file_path: &Path, name: &str) -> String {
        format!("{}::{}", file_path.display(), name)
    }

    /// Body length in lines, as used by the length statistics.
    pub fn body_length(&self) -> usize {
        self.line_end - self.line_start
    }

    pub fn complexity(&self) -> Option<u32> {
        self.details.complexity()
    }

    /// Base/supertype names; empty for anything but classes.
    pub fn bases(&self) -> &[String] {
        self.details.bases()
    }
}
