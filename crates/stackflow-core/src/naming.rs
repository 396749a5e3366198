//! Resource naming conventions
//!
//! Maps a stack identifier (`dev`, `prod`, ...) to the conventional names of
//! the resources a stack owns. Every function is pure.

use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};

/// Owner token used when a stack file does not declare `naming owner=...`
pub const DEFAULT_OWNER: &str = "midhun";

/// Keys accepted by [`NamingConvention::name_for`]
pub const NAMING_KEYS: &[&str] = &[
    "resource-group",
    "storage-account",
    "key-vault",
    "service-bus-namespace",
    "service-bus-queue",
    "service-bus-auth-rule:<rule>",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    owner: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
        }
    }
}

impl NamingConvention {
    pub fn new(owner: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        require_non_empty("owner", &owner)?;
        Ok(Self { owner })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// `{owner}-{stack}-new-rg`
    pub fn resource_group_name(&self, stack: &str) -> Result<String> {
        let stack = require_non_empty("stack", stack)?;
        Ok(format!("{}-{}-new-rg", self.owner, stack))
    }

    /// `{owner}{stack}newsa`, no separators since storage account names are alphanumeric
    pub fn storage_account_name(&self, stack: &str) -> Result<String> {
        let stack = require_non_empty("stack", stack)?;
        Ok(format!("{}{}newsa", self.owner, stack))
    }

    /// `{owner}-{stack}-new-vault`
    pub fn key_vault_name(&self, stack: &str) -> Result<String> {
        let stack = require_non_empty("stack", stack)?;
        Ok(format!("{}-{}-new-vault", self.owner, stack))
    }

    /// `{owner}-{stack}-sbns`
    pub fn service_bus_namespace_name(&self, stack: &str) -> Result<String> {
        let stack = require_non_empty("stack", stack)?;
        Ok(format!("{}-{}-sbns", self.owner, stack))
    }

    /// `{owner}-{stack}-sbqueue`
    pub fn service_bus_queue_name(&self, stack: &str) -> Result<String> {
        let stack = require_non_empty("stack", stack)?;
        Ok(format!("{}-{}-sbqueue", self.owner, stack))
    }

    /// `{owner}-{stack}-sbns-{rule_type}`
    pub fn service_bus_auth_rule_name(&self, stack: &str, rule_type: &str) -> Result<String> {
        let stack = require_non_empty("stack", stack)?;
        let rule_type = require_non_empty("rule type", rule_type)?;
        Ok(format!("{}-{}-sbns-{}", self.owner, stack, rule_type))
    }

    /// Name for one of [`NAMING_KEYS`], as used by `(naming)"key"` in stack files
    pub fn name_for(&self, key: &str, stack: &str) -> Result<String> {
        match key {
            "resource-group" => self.resource_group_name(stack),
            "storage-account" => self.storage_account_name(stack),
            "key-vault" => self.key_vault_name(stack),
            "service-bus-namespace" => self.service_bus_namespace_name(stack),
            "service-bus-queue" => self.service_bus_queue_name(stack),
            other => match other.split_once(':') {
                Some(("service-bus-auth-rule", rule)) => {
                    self.service_bus_auth_rule_name(stack, rule)
                }
                _ => Err(StackError::InvalidArgument(format!(
                    "unknown naming key '{}' (expected one of: {})",
                    other,
                    NAMING_KEYS.join(", ")
                ))),
            },
        }
    }

    /// Every conventional name for a stack, labelled by naming key
    pub fn all_names(&self, stack: &str, rule_type: &str) -> Result<Vec<(String, String)>> {
        Ok(vec![
            (
                "resource-group".to_string(),
                self.resource_group_name(stack)?,
            ),
            (
                "storage-account".to_string(),
                self.storage_account_name(stack)?,
            ),
            ("key-vault".to_string(), self.key_vault_name(stack)?),
            (
                "service-bus-namespace".to_string(),
                self.service_bus_namespace_name(stack)?,
            ),
            (
                "service-bus-queue".to_string(),
                self.service_bus_queue_name(stack)?,
            ),
            (
                format!("service-bus-auth-rule:{}", rule_type),
                self.service_bus_auth_rule_name(stack, rule_type)?,
            ),
        ])
    }
}

fn require_non_empty<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(StackError::InvalidArgument(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(value)
}
