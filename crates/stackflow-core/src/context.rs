//! Per-stack values available while a stack file is parsed

use crate::error::{Result, StackError};
use std::collections::BTreeMap;

/// Stack identifier plus its config and secret values
#[derive(Debug, Clone, Default)]
pub struct StackContext {
    stack: String,
    config: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
}

impl StackContext {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: BTreeMap<String, String>) -> Self {
        self.config.extend(config);
        self
    }

    pub fn with_secrets(mut self, secrets: BTreeMap<String, String>) -> Self {
        self.secrets.extend(secrets);
        self
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    pub fn set_secret(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(key.into(), value.into());
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn config(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn require_config(&self, key: &str) -> Result<&str> {
        self.config(key).ok_or_else(|| StackError::MissingConfig {
            key: key.to_string(),
            stack: self.stack.clone(),
        })
    }

    pub fn require_secret(&self, key: &str) -> Result<&str> {
        self.secrets
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| StackError::MissingSecret {
                key: key.to_string(),
                stack: self.stack.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_config() {
        let mut ctx = StackContext::new("dev");
        ctx.set_config("env", "dev");
        ctx.set_secret("tenantId", "0000-1111");

        assert_eq!(ctx.require_config("env").unwrap(), "dev");
        assert_eq!(ctx.require_secret("tenantId").unwrap(), "0000-1111");

        match ctx.require_config("vnetAddressSpace") {
            Err(StackError::MissingConfig { key, stack }) => {
                assert_eq!(key, "vnetAddressSpace");
                assert_eq!(stack, "dev");
            }
            other => panic!("Expected MissingConfig, got {:?}", other),
        }
        // secrets and plain config live in separate namespaces
        assert!(matches!(
            ctx.require_secret("env"),
            Err(StackError::MissingSecret { .. })
        ));
    }
}
