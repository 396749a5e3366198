//! Dry-run realizer
//!
//! Produces deterministic outputs without touching any cloud API: inputs are
//! echoed back, `id` is derived from the stack, kind and name, and any other
//! requested output gets a placeholder value.

use crate::realizer::{Outputs, ResolvedResource, Realizer};
use async_trait::async_trait;
use stackflow_core::ResourceMode;
use std::time::Duration;
use tracing::debug;

pub struct SimulatedRealizer {
    stack: String,
    defaults: Outputs,
    latency: Option<Duration>,
}

impl SimulatedRealizer {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            defaults: Outputs::new(),
            latency: None,
        }
    }

    /// Output reported for every resource that does not set the field itself
    pub fn with_default_output(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Simulated provisioning time per resource
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn resource_id(&self, resource: &ResolvedResource) -> String {
        match resource.mode {
            ResourceMode::Managed => {
                format!("/stacks/{}/{}/{}", self.stack, resource.kind, resource.name)
            }
            ResourceMode::Lookup => {
                format!("/external/{}/{}", resource.kind, resource.name)
            }
        }
    }
}

#[async_trait]
impl Realizer for SimulatedRealizer {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn realize(&self, resource: &ResolvedResource) -> anyhow::Result<Outputs> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut outputs = self.defaults.clone();
        outputs.extend(resource.inputs.clone());
        if let Some(tags) = &resource.tags {
            outputs.insert("tags".to_string(), tags.to_json());
        }
        outputs.insert("id".to_string(), self.resource_id(resource).into());

        for field in &resource.requested_outputs {
            outputs.entry(field.clone()).or_insert_with(|| {
                format!("{}:{}.{}", resource.kind, resource.name, field).into()
            });
        }

        debug!(
            resource = %resource.name,
            outputs = outputs.len(),
            "Simulated realization"
        );
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackflow_core::TagSet;
    use std::collections::BTreeMap;

    fn resource(name: &str, mode: ResourceMode) -> ResolvedResource {
        let mut inputs = BTreeMap::new();
        inputs.insert("name".to_string(), json!(format!("{}-name", name)));
        ResolvedResource {
            name: name.to_string(),
            kind: "azure:network/VirtualNetwork".to_string(),
            mode,
            inputs,
            tags: Some([("environment", "dev")].into_iter().collect::<TagSet>()),
            requested_outputs: vec!["name".to_string(), "guid".to_string()],
        }
    }

    #[tokio::test]
    async fn test_outputs_echo_inputs_and_fill_requested() {
        let realizer = SimulatedRealizer::new("dev").with_default_output("location", "westeurope");
        let outputs = realizer
            .realize(&resource("vNet", ResourceMode::Managed))
            .await
            .unwrap();

        assert_eq!(outputs["name"], json!("vNet-name"));
        assert_eq!(outputs["location"], json!("westeurope"));
        assert_eq!(
            outputs["id"],
            json!("/stacks/dev/azure:network/VirtualNetwork/vNet")
        );
        assert_eq!(
            outputs["guid"],
            json!("azure:network/VirtualNetwork:vNet.guid")
        );
        assert_eq!(outputs["tags"], json!({ "environment": "dev" }));
    }

    #[tokio::test]
    async fn test_lookup_ids_are_external() {
        let realizer = SimulatedRealizer::new("dev");
        let outputs = realizer
            .realize(&resource("remoteVnet", ResourceMode::Lookup))
            .await
            .unwrap();
        assert_eq!(
            outputs["id"],
            json!("/external/azure:network/VirtualNetwork/remoteVnet")
        );
    }

    #[tokio::test]
    async fn test_inputs_override_defaults() {
        let realizer = SimulatedRealizer::new("dev").with_default_output("name", "default");
        let outputs = realizer
            .realize(&resource("vNet", ResourceMode::Managed))
            .await
            .unwrap();
        assert_eq!(outputs["name"], json!("vNet-name"));
    }
}
