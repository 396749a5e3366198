//! Field values and output references
//!
//! A resource input is either known at declaration time (a literal) or
//! deferred until another resource has been realized.

use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reference to an output attribute of another resource (`vNet.name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputRef {
    /// Logical name of the producing resource
    pub node: String,

    /// Output field on the producing resource
    pub field: String,
}

impl OutputRef {
    pub fn new(node: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.field)
    }
}

impl FromStr for OutputRef {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((node, field)) if !node.is_empty() && !field.is_empty() => {
                Ok(Self::new(node, field))
            }
            _ => Err(StackError::InvalidOutputRef(s.to_string())),
        }
    }
}

/// Value of a resource input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Value known at declaration time
    Literal(serde_json::Value),

    /// Value produced by another resource once it is realized
    Deferred(OutputRef),

    /// Ordered list whose items may themselves be deferred
    List(Vec<FieldValue>),

    /// Nested block whose fields may themselves be deferred
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        FieldValue::Literal(value.into())
    }

    /// Deferred reference to `node.field`
    pub fn output(node: impl Into<String>, field: impl Into<String>) -> Self {
        FieldValue::Deferred(OutputRef::new(node, field))
    }

    /// Whether any part of this value is deferred
    pub fn is_deferred(&self) -> bool {
        match self {
            FieldValue::Literal(_) => false,
            FieldValue::Deferred(_) => true,
            FieldValue::List(items) => items.iter().any(FieldValue::is_deferred),
            FieldValue::Object(fields) => fields.values().any(FieldValue::is_deferred),
        }
    }

    /// All output references contained in this value, in traversal order
    pub fn references(&self) -> Vec<&OutputRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a OutputRef>) {
        match self {
            FieldValue::Literal(_) => {}
            FieldValue::Deferred(r) => refs.push(r),
            FieldValue::List(items) => {
                for item in items {
                    item.collect_references(refs);
                }
            }
            FieldValue::Object(fields) => {
                for value in fields.values() {
                    value.collect_references(refs);
                }
            }
        }
    }

    /// Replace every deferred reference with the value returned by `lookup`.
    ///
    /// Fails with the first reference `lookup` cannot answer.
    pub fn resolve<F>(&self, lookup: &F) -> std::result::Result<serde_json::Value, OutputRef>
    where
        F: Fn(&OutputRef) -> Option<serde_json::Value>,
    {
        match self {
            FieldValue::Literal(value) => Ok(value.clone()),
            FieldValue::Deferred(r) => lookup(r).ok_or_else(|| r.clone()),
            FieldValue::List(items) => items
                .iter()
                .map(|item| item.resolve(lookup))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            FieldValue::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, value) in fields {
                    map.insert(key.clone(), value.resolve(lookup)?);
                }
                Ok(serde_json::Value::Object(map))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Literal(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Literal(serde_json::Value::String(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Literal(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Literal(value.into())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Literal(value)
    }
}

impl From<OutputRef> for FieldValue {
    fn from(value: OutputRef) -> Self {
        FieldValue::Deferred(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        FieldValue::List(value)
    }
}

impl From<BTreeMap<String, FieldValue>> for FieldValue {
    fn from(value: BTreeMap<String, FieldValue>) -> Self {
        FieldValue::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_ref_parse() {
        let r: OutputRef = "vNet.name".parse().unwrap();
        assert_eq!(r, OutputRef::new("vNet", "name"));
        assert_eq!(r.to_string(), "vNet.name");
    }

    #[test]
    fn test_output_ref_parse_keeps_nested_field() {
        let r: OutputRef = "aks.kube_config.host".parse().unwrap();
        assert_eq!(r.node, "aks");
        assert_eq!(r.field, "kube_config.host");
    }

    #[test]
    fn test_output_ref_parse_invalid() {
        for input in ["vNet", ".name", "vNet.", ""] {
            assert!(matches!(
                input.parse::<OutputRef>(),
                Err(StackError::InvalidOutputRef(_))
            ));
        }
    }

    #[test]
    fn test_nested_references() {
        let mut ip_config = BTreeMap::new();
        ip_config.insert("subnet_id".to_string(), FieldValue::output("sNet", "id"));
        ip_config.insert("allocation".to_string(), FieldValue::from("dynamic"));
        let value = FieldValue::List(vec![FieldValue::Object(ip_config)]);

        assert!(value.is_deferred());
        assert_eq!(value.references(), vec![&OutputRef::new("sNet", "id")]);
        assert!(!FieldValue::from("LRS").is_deferred());
    }

    #[test]
    fn test_resolve() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), FieldValue::from("subnet1"));
        fields.insert("security_group".to_string(), FieldValue::output("nsg", "id"));
        let value = FieldValue::List(vec![FieldValue::Object(fields)]);

        let resolved = value
            .resolve(&|r: &OutputRef| (r.node == "nsg").then(|| json!("/nsg/1")))
            .unwrap();
        assert_eq!(
            resolved,
            json!([{ "name": "subnet1", "security_group": "/nsg/1" }])
        );
    }

    #[test]
    fn test_resolve_reports_missing_reference() {
        let value = FieldValue::output("rg", "location");
        let missing = value.resolve(&|_: &OutputRef| None).unwrap_err();
        assert_eq!(missing, OutputRef::new("rg", "location"));
    }
}
