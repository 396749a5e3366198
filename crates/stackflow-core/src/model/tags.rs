//! Shared tag sets

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable tag mapping shared by every resource that opts in.
///
/// Cloning a `TagSet` shares the underlying map instead of copying it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Arc<BTreeMap<String, String>>);

impl TagSet {
    pub fn new(tags: BTreeMap<String, String>) -> Self {
        Self(Arc::new(tags))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both handles point at the same underlying map
    pub fn shares_storage_with(&self, other: &TagSet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_storage() {
        let tags: TagSet = [("owner", "ops@example.com"), ("personal-data", "no")]
            .into_iter()
            .collect();
        let shared = tags.clone();
        assert!(shared.shares_storage_with(&tags));
        assert_eq!(shared.get("personal-data"), Some("no"));

        let copy: TagSet = [("owner", "ops@example.com"), ("personal-data", "no")]
            .into_iter()
            .collect();
        assert_eq!(copy, tags);
        assert!(!copy.shares_storage_with(&tags));
    }

    #[test]
    fn test_to_json() {
        let tags: TagSet = [("environment", "dev")].into_iter().collect();
        assert_eq!(tags.to_json(), serde_json::json!({ "environment": "dev" }));
    }
}
