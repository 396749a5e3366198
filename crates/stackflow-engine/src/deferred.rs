//! Deferred values
//!
//! A [`DeferredValue`] is a write-once cell for one resource output. Handles
//! are shared between the producer and every consumer; the evaluator resolves
//! the cell once the producer has been realized.

use crate::error::{EngineError, Result};
use stackflow_core::OutputRef;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone)]
pub struct DeferredValue {
    source: OutputRef,
    cell: Arc<OnceLock<serde_json::Value>>,
}

impl DeferredValue {
    pub fn new(source: OutputRef) -> Self {
        Self {
            source,
            cell: Arc::new(OnceLock::new()),
        }
    }

    pub fn source(&self) -> &OutputRef {
        &self.source
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<&serde_json::Value> {
        self.cell
            .get()
            .ok_or_else(|| EngineError::PendingValue(self.source.clone()))
    }

    pub fn resolve(&self, value: serde_json::Value) -> Result<()> {
        self.cell
            .set(value)
            .map_err(|_| EngineError::AlreadyResolved(self.source.clone()))
    }
}

/// Every deferred value of one evaluation, keyed by the output it waits for
#[derive(Debug, Default)]
pub struct ResolutionTable {
    cells: BTreeMap<OutputRef, DeferredValue>,
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for `reference`, created on first request
    pub fn handle(&mut self, reference: &OutputRef) -> DeferredValue {
        self.cells
            .entry(reference.clone())
            .or_insert_with(|| DeferredValue::new(reference.clone()))
            .clone()
    }

    pub fn get(&self, reference: &OutputRef) -> Option<&DeferredValue> {
        self.cells.get(reference)
    }

    pub fn value(&self, reference: &OutputRef) -> Result<&serde_json::Value> {
        self.cells
            .get(reference)
            .ok_or_else(|| EngineError::PendingValue(reference.clone()))?
            .get()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resolve every cell produced by `node` from its realized outputs.
    ///
    /// Returns the number of cells resolved. A requested field missing from
    /// `outputs` is an [`EngineError::UnresolvedReference`].
    pub fn resolve_from(
        &self,
        node: &str,
        outputs: &BTreeMap<String, serde_json::Value>,
    ) -> Result<usize> {
        let mut resolved = 0;
        for (reference, cell) in self
            .cells
            .range(OutputRef::new(node, "")..)
            .take_while(|(r, _)| r.node == node)
        {
            let value = outputs
                .get(&reference.field)
                .ok_or_else(|| EngineError::UnresolvedReference {
                    reference: reference.clone(),
                    completed: Vec::new(),
                })?;
            cell.resolve(value.clone())?;
            resolved += 1;
        }
        Ok(resolved)
    }
}
