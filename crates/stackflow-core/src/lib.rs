//! stackflow core
//!
//! Resource model, naming conventions and the KDL stack-file parser.
//! Graph construction and realization live in `stackflow-engine`.

pub mod context;
pub mod error;
pub mod model;
pub mod naming;
pub mod parser;

pub use context::StackContext;
pub use error::{Result, StackError};
pub use model::{FieldValue, OutputRef, ResourceMode, ResourceNode, Stack, TagSet};
pub use naming::{DEFAULT_OWNER, NAMING_KEYS, NamingConvention};
pub use parser::{parse_stack_file, parse_stack_str};
