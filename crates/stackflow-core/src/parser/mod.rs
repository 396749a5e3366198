//! KDL stack-file parser
//!
//! ```kdl
//! stack "poc"
//! naming owner="midhun"
//! tags "default" { environment (config)"env" }
//! resource "resourceGroup" kind="azure:core/ResourceGroup" tags="default" {
//!     name (naming)"resource-group"
//! }
//! output "rgName" (ref)"resourceGroup.name"
//! ```

mod resource;
mod value;

#[cfg(test)]
mod tests;

pub use resource::parse_naming;

use crate::context::StackContext;
use crate::error::{Result, StackError};
use crate::model::{ResourceMode, Stack};
use crate::naming::NamingConvention;
use kdl::KdlDocument;
use resource::{parse_output, parse_resource, parse_tags};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use value::{ValueResolver, first_string};

/// Parse a stack file; the project name defaults to the parent directory name
pub fn parse_stack_file<P: AsRef<Path>>(path: P, ctx: &StackContext) -> Result<Stack> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| StackError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_stack_str(&content, name, ctx)
}

/// Parse stack-file content
pub fn parse_stack_str(content: &str, default_name: String, ctx: &StackContext) -> Result<Stack> {
    let doc: KdlDocument = content.parse()?;

    // naming and tag sets may be declared anywhere in the file
    let mut naming = NamingConvention::default();
    for node in doc.nodes() {
        if node.name().value() == "naming" {
            naming = parse_naming(node)?;
        }
    }

    let resolver = ValueResolver::new(ctx, &naming);

    let mut tag_sets = BTreeMap::new();
    for node in doc.nodes() {
        if node.name().value() == "tags" {
            let (name, tags) = parse_tags(node, &resolver)?;
            if tag_sets.insert(name.clone(), tags).is_some() {
                return Err(StackError::InvalidConfig(format!(
                    "tag set '{}' declared twice",
                    name
                )));
            }
        }
    }

    let mut name = default_name;
    let mut resources = Vec::new();
    let mut outputs = BTreeMap::new();

    for node in doc.nodes() {
        match node.name().value() {
            "stack" => {
                if let Some(stack_name) = first_string(node) {
                    name = stack_name.to_string();
                }
            }
            "naming" | "tags" => {}
            "resource" => {
                resources.push(parse_resource(
                    node,
                    ResourceMode::Managed,
                    &resolver,
                    &tag_sets,
                )?);
            }
            "lookup" => {
                resources.push(parse_resource(
                    node,
                    ResourceMode::Lookup,
                    &resolver,
                    &tag_sets,
                )?);
            }
            "output" => {
                let (output_name, reference) = parse_output(node)?;
                if outputs.insert(output_name.clone(), reference).is_some() {
                    return Err(StackError::InvalidConfig(format!(
                        "output '{}' declared twice",
                        output_name
                    )));
                }
            }
            other => {
                debug!(node = other, "Skipping unknown top-level node");
            }
        }
    }

    debug!(
        stack = %name,
        resources = resources.len(),
        outputs = outputs.len(),
        "Parsed stack file"
    );

    Ok(Stack {
        name,
        naming,
        tag_sets,
        resources,
        outputs,
    })
}
