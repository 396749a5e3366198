//! Resource node model

use super::tags::TagSet;
use super::value::{FieldValue, OutputRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How a resource is brought into existence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    /// Created and owned by this stack
    #[default]
    Managed,
    /// Read from an externally managed resource (another stack, a portal-made vnet, ...)
    Lookup,
}

impl std::fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceMode::Managed => write!(f, "managed"),
            ResourceMode::Lookup => write!(f, "lookup"),
        }
    }
}

/// A named, typed unit of desired state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    name: String,
    kind: String,
    mode: ResourceMode,
    inputs: BTreeMap<String, FieldValue>,
    depends_on: Vec<String>,
    tags: Option<TagSet>,
}

impl ResourceNode {
    /// Managed resource of the given kind (e.g. "azure:network/VirtualNetwork")
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            mode: ResourceMode::Managed,
            inputs: BTreeMap::new(),
            depends_on: Vec::new(),
            tags: None,
        }
    }

    /// Lookup of an externally managed resource
    pub fn lookup(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            mode: ResourceMode::Lookup,
            ..Self::new(name, kind)
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_inputs(mut self, inputs: BTreeMap<String, FieldValue>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Explicit ordering edge that carries no value
    pub fn with_depends_on(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn mode(&self) -> ResourceMode {
        self.mode
    }

    pub fn is_lookup(&self) -> bool {
        self.mode == ResourceMode::Lookup
    }

    pub fn inputs(&self) -> &BTreeMap<String, FieldValue> {
        &self.inputs
    }

    pub fn input(&self, key: &str) -> Option<&FieldValue> {
        self.inputs.get(key)
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn tags(&self) -> Option<&TagSet> {
        self.tags.as_ref()
    }

    /// All deferred references across the input fields
    pub fn references(&self) -> Vec<&OutputRef> {
        self.inputs
            .values()
            .flat_map(FieldValue::references)
            .collect()
    }

    /// Names of every resource this one must wait for
    pub fn dependencies(&self) -> BTreeSet<&str> {
        self.references()
            .into_iter()
            .map(|r| r.node.as_str())
            .chain(self.depends_on.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_merge_references_and_depends_on() {
        let nic = ResourceNode::new("nic", "azure:network/NetworkInterface")
            .with_input("resource_group_name", FieldValue::output("resourceGroup", "name"))
            .with_input("location", FieldValue::output("resourceGroup", "location"))
            .with_input("subnet_id", FieldValue::output("sNet", "id"))
            .with_depends_on("nsg")
            .with_depends_on("nsg");

        let deps: Vec<&str> = nic.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["nsg", "resourceGroup", "sNet"]);
        assert_eq!(nic.references().len(), 3);
        assert_eq!(nic.depends_on(), ["nsg".to_string()]);
    }

    #[test]
    fn test_lookup_mode() {
        let subnet = ResourceNode::lookup("gsubnet1", "azure:network/getSubnet")
            .with_input("name", "subnet21");
        assert!(subnet.is_lookup());
        assert_eq!(subnet.mode().to_string(), "lookup");
        assert!(subnet.dependencies().is_empty());
    }
}
