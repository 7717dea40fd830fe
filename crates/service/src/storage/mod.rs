//! Storage engine for the box store
//!
//! Deep-merge rules and the JSON file-backed tree that persists them.

pub mod json_tree_store;
pub mod merge;
