use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use super::{Entity, EntityDetails, EntityKind};

/// Decision constructs counted in a routine's own body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionPoints {
    pub branches: u32,
    pub loops: u32,
    pub handlers: u32,
    /// Sum of `operands - 1` over every boolean combinator.
    pub boolean_operands: u32,
}

impl DecisionPoints {
    /// McCabe-style structural complexity: one path plus each decision point.
    pub fn score(&self) -> u32 {
        1 + self.branches + self.loops + self.handlers + self.boolean_operands
    }
}

/// Record the complexity score on a function or method; other kinds are left alone.
pub fn annotate(entity: &mut Entity, points: &DecisionPoints) {
    if !entity.kind.is_routine() {
        return;
    }
    if let EntityDetails::Routine { complexity, .. } = &mut entity.details {
        *complexity = points.score();
    }
}

/// Aggregate metrics over a full entity set.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ComplexityStats {
    pub total_functions: usize,
    pub total_methods: usize,
    pub total_classes: usize,
    pub total_walkers: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_abilities: usize,
    /// Methods declared in class bodies, whether or not they were analyzed.
    pub declared_methods: usize,
    pub files_analyzed: usize,
    pub avg_function_length: f64,
    pub max_function_length: usize,
    pub avg_complexity: f64,
    pub max_complexity: u32,
}

impl ComplexityStats {
    /// Single pass over `entities`. Averages over an empty subset are `0`.
    pub fn collect(entities: &[Entity]) -> Self {
        let mut stats = Self::default();
        let mut files: BTreeSet<&Path> = BTreeSet::new();
        let mut routines = 0usize;
        let mut length_sum = 0usize;
        let mut complexity_sum = 0u64;

        for entity in entities {
            files.insert(entity.file_path.as_path());

            match entity.kind {
                EntityKind::Function => stats.total_functions += 1,
                EntityKind::Method => stats.total_methods += 1,
                EntityKind::Class => {
                    stats.total_classes += 1;
                    stats.declared_methods += entity.details.declared_methods();
                }
                EntityKind::Walker => stats.total_walkers += 1,
                EntityKind::Node => stats.total_nodes += 1,
                EntityKind::Edge => stats.total_edges += 1,
                EntityKind::Ability => stats.total_abilities += 1,
            }

            if entity.kind.is_routine() {
                routines += 1;
                let length = entity.body_length();
                length_sum += length;
                stats.max_function_length = stats.max_function_length.max(length);

                let complexity = entity.complexity().unwrap_or(1);
                complexity_sum += u64::from(complexity);
                stats.max_complexity = stats.max_complexity.max(complexity);
            }
        }

        stats.files_analyzed = files.len();
        if routines > 0 {
            stats.avg_function_length = length_sum as f64 / routines as f64;
            stats.avg_complexity = complexity_sum as f64 / routines as f64;
        }

        stats
    }
}
