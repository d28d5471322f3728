//! Merge policy for settings sources.

pub mod merge_policy;
