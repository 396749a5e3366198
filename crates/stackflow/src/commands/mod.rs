pub mod graph;
pub mod names;
pub mod up;
pub mod validate;
