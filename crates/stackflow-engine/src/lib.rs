//! stackflow engine
//!
//! Turns a declared set of resources into a dependency-ordered run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Stack (stackflow-core parser)          │
//! └─────────────────┬────────────────────────────┘
//!                   │ GraphBuilder::from_stack
//! ┌─────────────────▼────────────────────────────┐
//! │  GraphBuilder  ──build──▶  EvaluationOrder    │
//! │  (edges from (ref) values and depends_on)     │
//! └─────────────────┬────────────────────────────┘
//!                   │ Evaluator::realize
//! ┌─────────────────▼────────────────────────────┐
//! │  ResolutionTable (write-once cells)           │
//! │  trait Realizer { async fn realize(..) }      │
//! └─────────────────┬────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │  Realization   │
//!           └────────────────┘
//! ```

pub mod deferred;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod realization;
pub mod realizer;
pub mod simulated;

// Re-exports
pub use deferred::{DeferredValue, ResolutionTable};
pub use error::{EngineError, Result};
pub use evaluator::Evaluator;
pub use graph::{EvaluationOrder, GraphBuilder};
pub use realization::{Realization, RealizationSummary};
pub use realizer::{FnRealizer, Outputs, Realizer, ResolvedResource};
pub use simulated::SimulatedRealizer;
pub use tokio_util::sync::CancellationToken;
