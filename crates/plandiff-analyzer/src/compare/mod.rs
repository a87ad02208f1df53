//! Plan comparison module
//!
//! Detects plan changes between two parsed EXPLAIN reports, typically the
//! same statement explained on two database versions.

mod comparator;
mod diff;

#[cfg(test)]
mod tests;

pub use comparator::*;
pub use diff::*;
