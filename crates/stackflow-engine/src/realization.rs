//! Result of a completed evaluation

use crate::realizer::Outputs;
use chrono::{DateTime, Utc};
use serde::Serialize;
use stackflow_core::ResourceMode;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct Realization {
    /// Realizer that performed the run
    pub realizer: String,

    /// Resources in the order they finished
    pub completed: Vec<String>,

    /// Outputs per resource
    pub outputs: BTreeMap<String, Outputs>,

    /// Resolved stack outputs
    pub exports: BTreeMap<String, serde_json::Value>,

    pub started_at: DateTime<Utc>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    #[serde(skip)]
    lookups: usize,
}

impl Realization {
    pub fn new(realizer: impl Into<String>) -> Self {
        Self {
            realizer: realizer.into(),
            completed: Vec::new(),
            outputs: BTreeMap::new(),
            exports: BTreeMap::new(),
            started_at: Utc::now(),
            duration_ms: 0,
            lookups: 0,
        }
    }

    pub(crate) fn record(&mut self, node: String, mode: ResourceMode, outputs: Outputs) {
        if mode == ResourceMode::Lookup {
            self.lookups += 1;
        }
        self.completed.push(node.clone());
        self.outputs.insert(node, outputs);
    }

    pub fn is_realized(&self, node: &str) -> bool {
        self.outputs.contains_key(node)
    }

    pub fn output(&self, node: &str, field: &str) -> Option<&serde_json::Value> {
        self.outputs.get(node).and_then(|o| o.get(field))
    }

    pub fn export(&self, name: &str) -> Option<&serde_json::Value> {
        self.exports.get(name)
    }

    pub fn summary(&self) -> RealizationSummary {
        RealizationSummary {
            managed: self.completed.len() - self.lookups,
            lookups: self.lookups,
            exports: self.exports.len(),
        }
    }
}

/// Summary of a realization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealizationSummary {
    pub managed: usize,
    pub lookups: usize,
    pub exports: usize,
}

impl std::fmt::Display for RealizationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} realized, {} looked up, {} outputs",
            self.managed, self.lookups, self.exports
        )
    }
}
