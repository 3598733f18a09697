use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::{Diagnostic, ScanError};
use super::{CodeGraph, ComplexityStats, Entity, EntityNormalizer, GraphBuilder};
use crate::parsers::{LanguageParser, ParserFactory, RawEntity};

/// One entry of the repository mapper's ordered file list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    #[serde(rename = "file_path")]
    pub path: PathBuf,
    pub language: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
        }
    }
}

/// A file whose contents the caller already holds.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub path: PathBuf,
    pub language: String,
    pub text: String,
}

impl SourceText {
    pub fn new(
        path: impl Into<PathBuf>,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerConfig {
    /// Scan files on the rayon pool. Output order is unaffected.
    pub parallel: bool,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub entities: Vec<Entity>,
    pub graph: CodeGraph,
    pub stats: ComplexityStats,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
struct FileScan {
    entities: Vec<Entity>,
    diagnostics: Vec<Diagnostic>,
}

pub struct CodebaseAnalyzer {
    parser_factory: ParserFactory,
    normalizer: EntityNormalizer,
    config: AnalyzerConfig,
}

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            parser_factory: ParserFactory::new(),
            normalizer: EntityNormalizer::new(),
            config,
        }
    }

    /// Read, scan and normalize every file, then build stats and the graph.
    /// Per-file failures become diagnostics; the run itself never fails.
    pub fn analyze(&self, files: &[SourceFile]) -> AnalysisReport {
        info!(files = files.len(), parallel = self.config.parallel, "scanning files");
        let scans = self.map_files(files, |file| {
            self.scan(&file.path, &file.language, |parser| parser.parse_file(&file.path))
        });
        self.assemble(scans)
    }

    pub fn analyze_sources(&self, sources: &[SourceText]) -> AnalysisReport {
        info!(files = sources.len(), parallel = self.config.parallel, "scanning sources");
        let scans = self.map_files(sources, |source| {
            self.scan(&source.path, &source.language, |parser| {
                parser.parse_source(&source.path, &source.text)
            })
        });
        self.assemble(scans)
    }

    /// Order-preserving map, so entity order always follows input order.
    fn map_files<T, F>(&self, items: &[T], scan: F) -> Vec<FileScan>
    where
        T: Sync,
        F: Fn(&T) -> FileScan + Sync + Send,
    {
        if self.config.parallel {
            items.par_iter().map(scan).collect()
        } else {
            items.iter().map(scan).collect()
        }
    }

    fn scan<F>(&self, path: &Path, language_tag: &str, run: F) -> FileScan
    where
        F: FnOnce(&dyn LanguageParser) -> Result<Vec<RawEntity>, ScanError>,
    {
        let outcome = self
            .parser_factory
            .parser_for_tag(path, language_tag)
            .and_then(|parser| {
                let language = parser.language();
                run(&*parser).map(|raw| (language, raw))
            });

        match outcome {
            Ok((language, raw)) => {
                let mut diagnostics = Vec::new();
                let entities = self
                    .normalizer
                    .normalize_file(path, language, raw, &mut diagnostics);
                debug!(file = %path.display(), entities = entities.len(), "scanned file");
                FileScan {
                    entities,
                    diagnostics,
                }
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping file");
                FileScan {
                    entities: Vec::new(),
                    diagnostics: vec![Diagnostic::from(&err)],
                }
            }
        }
    }

    fn assemble(&self, scans: Vec<FileScan>) -> AnalysisReport {
        let total: usize = scans.iter().map(|scan| scan.entities.len()).sum();
        let mut entities = Vec::with_capacity(total);
        let mut diagnostics = Vec::new();
        for scan in scans {
            entities.extend(scan.entities);
            diagnostics.extend(scan.diagnostics);
        }

        let stats = ComplexityStats::collect(&entities);
        let graph = GraphBuilder::from_entities(&entities);
        info!(
            entities = entities.len(),
            edges = graph.metadata.total_edges,
            diagnostics = diagnostics.len(),
            "analysis complete"
        );

        AnalysisReport {
            entities,
            graph,
            stats,
            diagnostics,
        }
    }
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
