pub mod error;

pub use error::*;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable pointing directly at a stack file
pub const STACK_FILE_ENV: &str = "STACKFLOW_FILE";

const CANDIDATES: [&str; 4] = [
    "stack.local.kdl",
    ".stack.local.kdl",
    "stack.kdl",
    ".stack.kdl",
];

/// Find the stack file for the current project
///
/// Search order:
/// 1. `STACKFLOW_FILE` (direct path)
/// 2. current directory: stack.local.kdl, .stack.local.kdl, stack.kdl, .stack.kdl
/// 3. `./.stackflow/` with the same names
/// 4. `~/.config/stackflow/stack.kdl`
pub fn find_stack_file() -> Result<PathBuf> {
    if let Ok(stack_path) = std::env::var(STACK_FILE_ENV) {
        let path = PathBuf::from(stack_path);
        if path.exists() {
            return Ok(path);
        }
        warn!(path = %path.display(), "{} points at a missing file", STACK_FILE_ENV);
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_in(&current_dir) {
        return Ok(path);
    }

    let stack_dir = current_dir.join(".stackflow");
    if stack_dir.is_dir()
        && let Some(path) = find_in(&stack_dir)
    {
        return Ok(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("stackflow").join("stack.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::StackFileNotFound)
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|filename| dir.join(filename))
        .find(|path| path.exists())
}

/// `Stack.<stack>.yaml` next to the stack file
pub fn stack_config_path(dir: &Path, stack: &str) -> PathBuf {
    dir.join(format!("Stack.{}.yaml", stack))
}

/// Config and secret values for one stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackConfig {
    pub config: BTreeMap<String, String>,
    pub secrets: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStackConfig {
    #[serde(default)]
    config: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    secrets: BTreeMap<String, serde_yaml::Value>,
}

/// Load `Stack.<stack>.yaml` from `dir`.
///
/// A stack without a config file gets an empty config; required keys are
/// reported when the stack file asks for them.
pub fn load_stack_config(dir: &Path, stack: &str) -> Result<StackConfig> {
    let path = stack_config_path(dir, stack);
    if !path.exists() {
        debug!(path = %path.display(), "No stack config file");
        return Ok(StackConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_stack_config(&content, &path)
}

/// Parse the contents of a stack config file; `path` is used for error messages
pub fn parse_stack_config(content: &str, path: &Path) -> Result<StackConfig> {
    let raw: Option<RawStackConfig> =
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    let raw = raw.unwrap_or_default();

    let config = stringify(raw.config, path)?;
    let secrets = stringify(raw.secrets, path)?;
    debug!(
        path = %path.display(),
        config = config.len(),
        secrets = secrets.len(),
        "Loaded stack config"
    );
    Ok(StackConfig { config, secrets })
}

fn stringify(
    values: BTreeMap<String, serde_yaml::Value>,
    path: &Path,
) -> Result<BTreeMap<String, String>> {
    values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        path: path.to_path_buf(),
                    });
                }
            };
            Ok((key, text))
        })
        .collect()
}
