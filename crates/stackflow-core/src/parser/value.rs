//! Field value parsing
//!
//! Type annotations select how a value is produced:
//!
//! - `(ref)"vNet.name"`: deferred reference to another resource's output
//! - `(config)"env"`: required stack config value
//! - `(secret)"tenantId"`: required stack secret
//! - `(naming)"key-vault"`: conventional name for the current stack

use crate::context::StackContext;
use crate::error::{Result, StackError};
use crate::model::{FieldValue, OutputRef};
use crate::naming::NamingConvention;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use std::collections::BTreeMap;

/// Child node name marking a list item
const LIST_ITEM: &str = "-";

pub(crate) struct ValueResolver<'a> {
    ctx: &'a StackContext,
    naming: &'a NamingConvention,
}

impl<'a> ValueResolver<'a> {
    pub(crate) fn new(ctx: &'a StackContext, naming: &'a NamingConvention) -> Self {
        Self { ctx, naming }
    }

    /// Value of a single entry, honoring its type annotation
    pub(crate) fn entry_value(&self, entry: &KdlEntry) -> Result<FieldValue> {
        let Some(annotation) = entry.ty().map(|t| t.value()) else {
            return Ok(FieldValue::Literal(kdl_to_json(entry.value())));
        };

        let key = entry.value().as_string().ok_or_else(|| {
            StackError::InvalidConfig(format!("({}) requires a string value", annotation))
        })?;

        match annotation {
            "ref" => Ok(FieldValue::Deferred(key.parse::<OutputRef>()?)),
            "config" => Ok(FieldValue::from(self.ctx.require_config(key)?)),
            "secret" => Ok(FieldValue::from(self.ctx.require_secret(key)?)),
            "naming" => Ok(FieldValue::from(
                self.naming.name_for(key, self.ctx.stack())?,
            )),
            other => Err(StackError::InvalidConfig(format!(
                "unknown value annotation '({})'",
                other
            ))),
        }
    }

    /// Value of a field node: scalar, list of entries, nested block or `-` list
    pub(crate) fn node_value(&self, node: &KdlNode) -> Result<FieldValue> {
        let args: Vec<&KdlEntry> = positional(node).collect();

        if let Some(children) = node.children()
            && !children.nodes().is_empty()
        {
            if !args.is_empty() {
                return Err(StackError::InvalidConfig(format!(
                    "'{}' cannot have both a value and a block",
                    node.name().value()
                )));
            }

            if children
                .nodes()
                .iter()
                .all(|child| child.name().value() == LIST_ITEM)
            {
                return children
                    .nodes()
                    .iter()
                    .map(|child| self.node_value(child))
                    .collect::<Result<Vec<_>>>()
                    .map(FieldValue::List);
            }

            return self.fields(children, &[]).map(FieldValue::Object);
        }

        match args.as_slice() {
            [] => Ok(FieldValue::Literal(serde_json::Value::Null)),
            [single] => self.entry_value(single),
            many => many
                .iter()
                .map(|entry| self.entry_value(entry))
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
        }
    }

    /// Fields of a block; repeated keys collect into a list
    pub(crate) fn fields(
        &self,
        doc: &KdlDocument,
        reserved: &[&str],
    ) -> Result<BTreeMap<String, FieldValue>> {
        let mut grouped: BTreeMap<String, Vec<FieldValue>> = BTreeMap::new();

        for child in doc.nodes() {
            let key = child.name().value();
            if reserved.contains(&key) {
                continue;
            }
            if key == LIST_ITEM {
                return Err(StackError::InvalidConfig(
                    "list items ('-') cannot be mixed with named fields".to_string(),
                ));
            }
            grouped
                .entry(key.to_string())
                .or_default()
                .push(self.node_value(child)?);
        }

        Ok(grouped
            .into_iter()
            .map(|(key, mut values)| {
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    FieldValue::List(values)
                };
                (key, value)
            })
            .collect())
    }
}

/// Entries without a property name
pub(crate) fn positional(node: &KdlNode) -> impl Iterator<Item = &KdlEntry> {
    node.entries().iter().filter(|e| e.name().is_none())
}

/// Value of the `key=...` property on a node
pub(crate) fn property<'n>(node: &'n KdlNode, key: &str) -> Option<&'n KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .map(|e| e.value())
}

/// First positional string argument (the node's name for `resource "x"` etc.)
pub(crate) fn first_string(node: &KdlNode) -> Option<&str> {
    positional(node).next().and_then(|e| e.value().as_string())
}

pub(crate) fn kdl_to_json(value: &KdlValue) -> serde_json::Value {
    if let Some(s) = value.as_string() {
        serde_json::Value::String(s.to_string())
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i)
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::String(i.to_string()))
    } else if let Some(f) = value.as_float() {
        serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    } else if let Some(b) = value.as_bool() {
        serde_json::Value::Bool(b)
    } else {
        serde_json::Value::Null
    }
}
