use colored::Colorize;
use stackflow_core::{Stack, StackContext};
use std::path::PathBuf;

/// Stack used when neither the arguments nor `STACKFLOW_STACK` name one
pub const DEFAULT_STACK: &str = "dev";

/// Environment variable consulted when no stack is given on the command line
pub const STACK_ENV: &str = "STACKFLOW_STACK";

pub struct LoadedStack {
    pub path: PathBuf,
    pub stack: Stack,
}

/// Stack name from the positional argument, the `-s` flag, then `STACKFLOW_STACK`
pub fn stack_name(positional: Option<String>, flag: Option<String>) -> String {
    resolve_stack_name(positional, flag, std::env::var(STACK_ENV).ok())
}

fn resolve_stack_name(
    positional: Option<String>,
    flag: Option<String>,
    env: Option<String>,
) -> String {
    positional
        .or(flag)
        .or(env.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| DEFAULT_STACK.to_string())
}

/// Find the stack file, load `Stack.<stack>.yaml` beside it and parse
pub fn load(stack_name: &str) -> anyhow::Result<LoadedStack> {
    let path = match stackflow_config::find_stack_file() {
        Ok(path) => path,
        Err(e @ stackflow_config::ConfigError::StackFileNotFound) => {
            eprintln!("{}", "✗ No stack file found".red().bold());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let stack_config = stackflow_config::load_stack_config(&dir, stack_name)?;
    let ctx = StackContext::new(stack_name)
        .with_config(stack_config.config)
        .with_secrets(stack_config.secrets);

    let stack = stackflow_core::parse_stack_file(&path, &ctx)?;
    tracing::debug!(
        path = %path.display(),
        stack = stack_name,
        resources = stack.resources.len(),
        "Loaded stack"
    );
    Ok(LoadedStack { path, stack })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_name_precedence() {
        let env = || Some("qa".to_string());
        assert_eq!(resolve_stack_name(Some("prod".into()), None, env()), "prod");
        assert_eq!(resolve_stack_name(None, Some("stg".into()), env()), "stg");
        assert_eq!(resolve_stack_name(None, None, env()), "qa");
        assert_eq!(resolve_stack_name(None, None, Some(String::new())), DEFAULT_STACK);
        assert_eq!(resolve_stack_name(None, None, None), DEFAULT_STACK);
    }
}
