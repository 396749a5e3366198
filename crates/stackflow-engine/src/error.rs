//! Graph construction and evaluation errors

use stackflow_core::OutputRef;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Resource already declared: {0}")]
    DuplicateName(String),

    #[error("Stack output already declared: {0}")]
    DuplicateExport(String),

    #[error("Resource '{0}' references its own outputs")]
    SelfReference(String),

    #[error("'{node}' references undeclared resource '{target}'")]
    UnknownReference { node: String, target: String },

    #[error("Dependency cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    #[error("Output '{reference}' was not returned by the resource that produces it ({} resources already realized)", .completed.len())]
    UnresolvedReference {
        reference: OutputRef,
        completed: Vec<String>,
    },

    #[error("Failed to realize '{node}' ({} resources already realized): {source}", .completed.len())]
    RealizationFailure {
        node: String,
        completed: Vec<String>,
        #[source]
        source: anyhow::Error,
    },

    #[error("Realization cancelled after {} resources, {remaining} not started", .completed.len())]
    Cancelled {
        completed: Vec<String>,
        remaining: usize,
    },

    #[error("Evaluation stalled, no realizable resource among: {}", .0.join(", "))]
    Stalled(Vec<String>),

    #[error("Deferred value '{0}' read before it was resolved")]
    PendingValue(OutputRef),

    #[error("Deferred value '{0}' resolved twice")]
    AlreadyResolved(OutputRef),
}

impl EngineError {
    /// Resources committed before the run stopped, for errors raised mid-run
    pub fn completed(&self) -> &[String] {
        match self {
            EngineError::RealizationFailure { completed, .. }
            | EngineError::UnresolvedReference { completed, .. }
            | EngineError::Cancelled { completed, .. } => completed,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
