pub mod analyzer;
pub mod complexity;
pub mod entity;
pub mod error;
pub mod graph;
pub mod normalizer;
pub mod query;

pub use analyzer::{AnalysisReport, AnalyzerConfig, CodebaseAnalyzer, SourceFile, SourceText};
pub use complexity::{ComplexityStats, DecisionPoints};
pub use entity::{Entity, EntityDetails, EntityKind, Language, MethodDescriptor, Parameter};
pub use error::{Diagnostic, DiagnosticKind, ScanError};
pub use graph::{CodeGraph, DependencyGraph, EdgeType, GraphBuilder, GraphEdge, GraphNode};
pub use normalizer::EntityNormalizer;
pub use query::{QueryEngine, RelatedEntity, Relationship, RelationshipFilter};
