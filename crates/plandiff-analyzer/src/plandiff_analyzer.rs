//! plandiff Analyzer - EXPLAIN report parsing and plan comparison
//!
//! This crate provides functionality for:
//! - Parsing the bordered, tree-drawn EXPLAIN report into a typed operator tree
//! - Classifying operators, task locations and join kinds
//! - Comparing two plans to detect plan changes across database versions

pub mod compare;
pub mod error;
pub mod explain;

pub use compare::*;
pub use error::{ExplainError, FormatError, Result};
pub use explain::*;
