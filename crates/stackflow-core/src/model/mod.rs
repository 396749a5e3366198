//! Data model
//!
//! Resources, their field values and the stack declaration that groups them.

mod resource;
mod stack;
mod tags;
mod value;

pub use resource::{ResourceMode, ResourceNode};
pub use stack::Stack;
pub use tags::TagSet;
pub use value::{FieldValue, OutputRef};
