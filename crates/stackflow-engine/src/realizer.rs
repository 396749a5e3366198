//! Realizer trait definition
//!
//! A realizer performs the side effect for one resource (creating it, or
//! reading it for lookups) and reports its outputs. It is the only seam
//! between the graph and a provisioning engine.

use async_trait::async_trait;
use serde::Serialize;
use stackflow_core::{ResourceMode, TagSet};
use std::collections::BTreeMap;

/// Output attributes of a realized resource
pub type Outputs = BTreeMap<String, serde_json::Value>;

/// A resource with every deferred input replaced by its concrete value
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedResource {
    pub name: String,
    pub kind: String,
    pub mode: ResourceMode,
    pub inputs: BTreeMap<String, serde_json::Value>,
    pub tags: Option<TagSet>,

    /// Output fields later resources or stack outputs will read
    pub requested_outputs: Vec<String>,
}

#[async_trait]
pub trait Realizer: Send + Sync {
    /// Realizer name for logs and reports
    fn name(&self) -> &str;

    /// Realize one resource and return its outputs.
    ///
    /// The outputs must contain every field in `requested_outputs`.
    async fn realize(&self, resource: &ResolvedResource) -> anyhow::Result<Outputs>;
}

/// Realizer backed by a synchronous closure
pub struct FnRealizer<F> {
    name: String,
    realize: F,
}

impl<F> FnRealizer<F>
where
    F: Fn(&ResolvedResource) -> anyhow::Result<Outputs> + Send + Sync,
{
    pub fn new(name: impl Into<String>, realize: F) -> Self {
        Self {
            name: name.into(),
            realize,
        }
    }
}

#[async_trait]
impl<F> Realizer for FnRealizer<F>
where
    F: Fn(&ResolvedResource) -> anyhow::Result<Outputs> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn realize(&self, resource: &ResolvedResource) -> anyhow::Result<Outputs> {
        (self.realize)(resource)
    }
}
