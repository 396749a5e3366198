//! Evaluator
//!
//! Walks an [`EvaluationOrder`], resolving each resource's deferred inputs from
//! the outputs of resources realized before it, and hands the resolved
//! resource to a [`Realizer`].
//!
//! Failures stop the run: nothing new is scheduled, in-flight realizations are
//! allowed to finish, and resources realized so far stay committed.

use crate::deferred::ResolutionTable;
use crate::error::{EngineError, Result};
use crate::graph::EvaluationOrder;
use crate::realization::Realization;
use crate::realizer::{Realizer, ResolvedResource};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use stackflow_core::{OutputRef, ResourceNode};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Evaluator {
    concurrency: usize,
    cancel: CancellationToken,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            concurrency: 1,
            cancel: CancellationToken::new(),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of realizer calls in flight (at least 1)
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops scheduling new realizations once cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Realize every resource of `order` through `realizer`
    #[tracing::instrument(skip_all, fields(realizer = %realizer.name()))]
    pub async fn realize<R>(&self, order: EvaluationOrder, realizer: &R) -> Result<Realization>
    where
        R: Realizer + ?Sized,
    {
        let started = Instant::now();
        let EvaluationOrder {
            nodes: mut queue,
            requested,
            exports,
        } = order;

        let mut table = ResolutionTable::new();
        for node in &queue {
            for reference in node.references() {
                table.handle(reference);
            }
        }
        for reference in exports.values() {
            table.handle(reference);
        }

        let mut realization = Realization::new(realizer.name());
        let mut in_flight = FuturesUnordered::new();
        let mut failure: Option<EngineError> = None;

        loop {
            while failure.is_none()
                && !self.cancel.is_cancelled()
                && in_flight.len() < self.concurrency
            {
                let Some(position) = queue.iter().position(|node| {
                    node.dependencies()
                        .iter()
                        .all(|dep| realization.is_realized(dep))
                }) else {
                    break;
                };
                let Some(node) = queue.remove(position) else {
                    break;
                };

                let resource = match resolve_inputs(&node, &table, &requested) {
                    Ok(resource) => resource,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                };

                info!(
                    resource = %resource.name,
                    kind = %resource.kind,
                    mode = %resource.mode,
                    "Realizing resource"
                );
                in_flight.push(async move {
                    let result = realizer.realize(&resource).await;
                    (resource, result)
                });
            }

            let Some((resource, result)) = in_flight.next().await else {
                break;
            };

            match result {
                Ok(outputs) => {
                    let resolved = table.resolve_from(&resource.name, &outputs);
                    realization.record(resource.name.clone(), resource.mode, outputs);
                    match resolved {
                        Ok(count) => {
                            info!(
                                resource = %resource.name,
                                resolved = count,
                                "Resource realized"
                            );
                        }
                        Err(e) => {
                            warn!(resource = %resource.name, error = %e, "Realizer broke its contract");
                            failure.get_or_insert(e);
                        }
                    }
                }
                Err(source) => {
                    warn!(resource = %resource.name, error = %source, "Realization failed");
                    failure.get_or_insert(EngineError::RealizationFailure {
                        node: resource.name,
                        completed: Vec::new(),
                        source,
                    });
                }
            }
        }

        let completed = realization.completed.clone();
        if let Some(err) = failure {
            return Err(match err {
                EngineError::RealizationFailure { node, source, .. } => {
                    EngineError::RealizationFailure {
                        node,
                        completed,
                        source,
                    }
                }
                EngineError::UnresolvedReference { reference, .. } => {
                    EngineError::UnresolvedReference {
                        reference,
                        completed,
                    }
                }
                other => other,
            });
        }

        if !queue.is_empty() {
            if self.cancel.is_cancelled() {
                warn!(
                    completed = completed.len(),
                    remaining = queue.len(),
                    "Realization cancelled"
                );
                return Err(EngineError::Cancelled {
                    completed,
                    remaining: queue.len(),
                });
            }
            return Err(EngineError::Stalled(
                queue.iter().map(|n| n.name().to_string()).collect(),
            ));
        }

        for (name, reference) in &exports {
            realization
                .exports
                .insert(name.clone(), table.value(reference)?.clone());
        }
        realization.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            summary = %realization.summary(),
            duration_ms = realization.duration_ms,
            "Realization complete"
        );
        Ok(realization)
    }
}

fn resolve_inputs(
    node: &ResourceNode,
    table: &ResolutionTable,
    requested: &HashMap<String, BTreeSet<String>>,
) -> Result<ResolvedResource> {
    let lookup = |reference: &OutputRef| {
        table
            .get(reference)
            .and_then(|cell| cell.get().ok())
            .cloned()
    };

    let mut inputs = BTreeMap::new();
    for (key, value) in node.inputs() {
        let resolved = value.resolve(&lookup).map_err(EngineError::PendingValue)?;
        inputs.insert(key.clone(), resolved);
    }

    Ok(ResolvedResource {
        name: node.name().to_string(),
        kind: node.kind().to_string(),
        mode: node.mode(),
        inputs,
        tags: node.tags().cloned(),
        requested_outputs: requested
            .get(node.name())
            .map(|fields| fields.iter().cloned().collect())
            .unwrap_or_default(),
    })
}
