// src/filtering/mod.rs

//! Provides standalone path filtering used when building and loading the tree.
//!
//! These are exposed publicly to allow for their use in other contexts.

// Declare the sub-modules within the filtering module
mod binary;
mod ignore;

pub use binary::is_binary_path;
pub use ignore::IgnoreMatcher;
