//! Top-level stack nodes: naming, tags, resource, lookup, output

use super::value::{ValueResolver, first_string, positional, property};
use crate::error::{Result, StackError};
use crate::model::{FieldValue, OutputRef, ResourceMode, ResourceNode, TagSet};
use crate::naming::NamingConvention;
use kdl::KdlNode;
use std::collections::BTreeMap;

const DEPENDS_ON: &[&str] = &["depends_on", "depends-on"];

/// `naming owner="midhun"`
pub fn parse_naming(node: &KdlNode) -> Result<NamingConvention> {
    match property(node, "owner").or_else(|| positional(node).next().map(|e| e.value())) {
        Some(owner) => {
            let owner = owner.as_string().ok_or_else(|| {
                StackError::InvalidConfig("naming owner must be a string".to_string())
            })?;
            NamingConvention::new(owner)
        }
        None => Ok(NamingConvention::default()),
    }
}

/// `tags "default" { owner "..."; environment (config)"env" }`
pub(crate) fn parse_tags(node: &KdlNode, resolver: &ValueResolver) -> Result<(String, TagSet)> {
    let name = first_string(node)
        .ok_or_else(|| StackError::InvalidConfig("tags requires a name".to_string()))?
        .to_string();

    let mut tags = BTreeMap::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value().to_string();
            let entry = positional(child).next().ok_or_else(|| {
                StackError::InvalidConfig(format!("tag '{}' in '{}' has no value", key, name))
            })?;
            let value = match resolver.entry_value(entry)? {
                FieldValue::Literal(serde_json::Value::String(s)) => s,
                FieldValue::Literal(other) => other.to_string(),
                _ => {
                    return Err(StackError::InvalidConfig(format!(
                        "tag '{}' in '{}' must be a literal",
                        key, name
                    )));
                }
            };
            tags.insert(key, value);
        }
    }

    Ok((name, TagSet::new(tags)))
}

/// `resource "vNet" kind="..." tags="default" { ... }` or `lookup "..." kind="..." { ... }`
pub(crate) fn parse_resource(
    node: &KdlNode,
    mode: ResourceMode,
    resolver: &ValueResolver,
    tag_sets: &BTreeMap<String, TagSet>,
) -> Result<ResourceNode> {
    let keyword = node.name().value();
    let name = first_string(node)
        .ok_or_else(|| StackError::InvalidConfig(format!("{} requires a name", keyword)))?;
    // (ref)"<resource>.<field>" splits at the first '.'
    if name.trim().is_empty() {
        return Err(StackError::InvalidConfig(format!(
            "{} name must not be empty",
            keyword
        )));
    }
    if name.contains('.') {
        return Err(StackError::InvalidConfig(format!(
            "{} name '{}' must not contain '.'",
            keyword, name
        )));
    }

    let kind = property(node, "kind")
        .and_then(|v| v.as_string())
        .ok_or_else(|| {
            StackError::InvalidConfig(format!("{} '{}' requires kind=\"...\"", keyword, name))
        })?;

    let mut resource = match mode {
        ResourceMode::Managed => ResourceNode::new(name, kind),
        ResourceMode::Lookup => ResourceNode::lookup(name, kind),
    };

    if let Some(tag_value) = property(node, "tags") {
        let tag_name = tag_value.as_string().ok_or_else(|| {
            StackError::InvalidConfig(format!("tags on '{}' must name a tag set", name))
        })?;
        let tags = tag_sets.get(tag_name).ok_or_else(|| {
            StackError::InvalidConfig(format!(
                "'{}' uses undeclared tag set '{}'",
                name, tag_name
            ))
        })?;
        resource = resource.with_tags(tags.clone());
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            if DEPENDS_ON.contains(&child.name().value()) {
                for entry in positional(child) {
                    let dep = entry.value().as_string().ok_or_else(|| {
                        StackError::InvalidConfig(format!(
                            "depends_on of '{}' must list resource names",
                            name
                        ))
                    })?;
                    resource = resource.with_depends_on(dep);
                }
            }
        }
        resource = resource.with_inputs(resolver.fields(children, DEPENDS_ON)?);
    }

    Ok(resource)
}

/// `output "subnetId" (ref)"gsubnet1.id"`
pub(crate) fn parse_output(node: &KdlNode) -> Result<(String, OutputRef)> {
    let mut args = positional(node);
    let name = args
        .next()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| StackError::InvalidConfig("output requires a name".to_string()))?
        .to_string();

    let entry = args.next().ok_or_else(|| {
        StackError::InvalidConfig(format!("output '{}' requires a (ref) value", name))
    })?;
    if let Some(annotation) = entry.ty().map(|t| t.value())
        && annotation != "ref"
    {
        return Err(StackError::InvalidConfig(format!(
            "output '{}' must be a (ref), got ({})",
            name, annotation
        )));
    }
    let reference = entry
        .value()
        .as_string()
        .ok_or_else(|| StackError::InvalidConfig(format!("output '{}' must be a string", name)))?
        .parse::<OutputRef>()?;

    Ok((name, reference))
}
