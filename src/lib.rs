//! # CCG
//!
//! Code Context Graph: canonical entities and a call/inheritance graph for a
//! set of source files.
//!
//! ## Pipeline
//!
//! `(file path, language)` → scanner → raw entities → normalizer → entities
//! (complexity annotated) → graph builder → `{nodes, edges, metadata}` → query
//! engine.
//!
//! ## Supported Languages
//!
//! Python (tree-sitter grammar), Jac (pattern-based scanner)

pub mod core;
pub mod formatters;
pub mod parsers;
