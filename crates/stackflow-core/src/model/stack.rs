//! Parsed stack declaration

use super::resource::ResourceNode;
use super::tags::TagSet;
use super::value::OutputRef;
use crate::naming::NamingConvention;
use std::collections::BTreeMap;

/// A stack file after config lookups, naming keys and tag sets have been applied
#[derive(Debug, Clone, Default)]
pub struct Stack {
    /// Project name (`stack "..."`)
    pub name: String,

    /// Naming convention used for `(naming)` values
    pub naming: NamingConvention,

    /// Named tag sets, shared by reference with the resources that use them
    pub tag_sets: BTreeMap<String, TagSet>,

    /// Resources in declaration order
    pub resources: Vec<ResourceNode>,

    /// Stack outputs exported after realization
    pub outputs: BTreeMap<String, OutputRef>,
}

impl Stack {
    pub fn resource(&self, name: &str) -> Option<&ResourceNode> {
        self.resources.iter().find(|r| r.name() == name)
    }

    pub fn resources_by_kind(&self, kind: &str) -> Vec<&ResourceNode> {
        self.resources.iter().filter(|r| r.kind() == kind).collect()
    }

    pub fn lookups(&self) -> impl Iterator<Item = &ResourceNode> {
        self.resources.iter().filter(|r| r.is_lookup())
    }
}
