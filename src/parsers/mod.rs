pub mod common;
pub mod jac;
pub mod python;

use std::fs;
use std::path::Path;

use crate::core::complexity::DecisionPoints;
use crate::core::error::{ScanError, ScanResult};
use crate::core::{EntityDetails, EntityKind, Language, Parameter};

/// Entity record as a scanner emits it, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    pub kind: EntityKind,
    pub name: String,
    pub line_start: usize,
    pub line_end: usize,
    pub docstring: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Referenced names in discovery order; may repeat.
    pub dependencies: Vec<String>,
    pub details: EntityDetails,
    /// Present for routines; scored by the complexity analyzer.
    pub decision_points: Option<DecisionPoints>,
}

impl RawEntity {
    pub fn new(kind: EntityKind, name: impl Into<String>, line_start: usize, line_end: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            line_start,
            line_end,
            docstring: None,
            parameters: Vec::new(),
            dependencies: Vec::new(),
            details: EntityDetails::Marker,
            decision_points: None,
        }
    }
}

pub trait LanguageParser {
    /// Scan already-loaded source text.
    fn parse_source(&self, file_path: &Path, source: &str) -> ScanResult<Vec<RawEntity>>;

    fn language(&self) -> Language;

    fn parse_file(&self, file_path: &Path) -> ScanResult<Vec<RawEntity>> {
        let source = fs::read_to_string(file_path).map_err(|source| ScanError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        self.parse_source(file_path, &source)
    }
}

pub struct ParserFactory;

impl ParserFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn get_parser(&self, language: Language) -> Box<dyn LanguageParser + Send + Sync> {
        match language {
            Language::Python => Box::new(python::PythonParser::new()),
            Language::Jac => Box::new(jac::JacParser::new()),
        }
    }

    /// Resolve a mapper-supplied language tag for `file_path`.
    pub fn parser_for_tag(
        &self,
        file_path: &Path,
        tag: &str,
    ) -> ScanResult<Box<dyn LanguageParser + Send + Sync>> {
        Language::from_tag(tag)
            .map(|language| self.get_parser(language))
            .ok_or_else(|| ScanError::UnsupportedLanguage {
                path: file_path.to_path_buf(),
                language: tag.to_string(),
            })
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}
