//! Plan difference data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::explain::plan::{JoinType, OpType, TaskType};

/// The first difference found between two plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Difference {
    /// The plans explain different statements
    SqlText { left: String, right: String },
    OperatorType {
        left_id: String,
        right_id: String,
        left: OpType,
        right: OpType,
    },
    TaskLocation {
        left_id: String,
        right_id: String,
        left: TaskType,
        right: TaskType,
    },
    ChildCount {
        left_id: String,
        right_id: String,
        left: usize,
        right: usize,
    },
    /// Scans over different tables
    Table {
        left_id: String,
        right_id: String,
        left: String,
        right: String,
    },
    /// Index scans over different indexes
    Index {
        left_id: String,
        right_id: String,
        left: String,
        right: String,
    },
    /// Joins of different kinds; only reported when join kinds are compared
    JoinType {
        left_id: String,
        right_id: String,
        left: Option<JoinType>,
        right: Option<JoinType>,
    },
}

impl Difference {
    /// Ids of the two operators that differ; `None` for a SQL text difference
    pub fn operator_ids(&self) -> Option<(&str, &str)> {
        match self {
            Self::SqlText { .. } => None,
            Self::OperatorType {
                left_id, right_id, ..
            }
            | Self::TaskLocation {
                left_id, right_id, ..
            }
            | Self::ChildCount {
                left_id, right_id, ..
            }
            | Self::Table {
                left_id, right_id, ..
            }
            | Self::Index {
                left_id, right_id, ..
            }
            | Self::JoinType {
                left_id, right_id, ..
            } => Some((left_id, right_id)),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqlText { .. } => f.write_str("differing SQL text"),
            Self::OperatorType {
                left_id,
                right_id,
                left,
                right,
            } => write!(
                f,
                "{} and {} have different types: {} vs {}",
                left_id, right_id, left, right
            ),
            Self::TaskLocation {
                left_id,
                right_id,
                left,
                right,
            } => write!(
                f,
                "{} and {} have different task locations: {} vs {}",
                left_id, right_id, left, right
            ),
            Self::ChildCount {
                left_id,
                right_id,
                left,
                right,
            } => write!(
                f,
                "{} and {} have different children lengths: {} vs {}",
                left_id, right_id, left, right
            ),
            Self::Table {
                left_id,
                right_id,
                left,
                right,
            } => write!(
                f,
                "{}:{}, {}:{} scan different tables",
                left_id, left, right_id, right
            ),
            Self::Index {
                left_id,
                right_id,
                left,
                right,
            } => write!(
                f,
                "{}:{}, {}:{} scan different indexes",
                left_id, left, right_id, right
            ),
            Self::JoinType {
                left_id,
                right_id,
                left,
                right,
            } => write!(
                f,
                "{} and {} have different join types: {} vs {}",
                left_id,
                right_id,
                join_type_name(*left),
                join_type_name(*right)
            ),
        }
    }
}

fn join_type_name(join_type: Option<JoinType>) -> &'static str {
    join_type.map(|j| j.as_str()).unwrap_or("unknown join")
}

/// Outcome of comparing two plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Same,
    Different(Difference),
}

impl Verdict {
    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same)
    }

    /// Human-readable reason; empty when the plans are the same
    pub fn reason(&self) -> String {
        match self {
            Self::Same => String::new(),
            Self::Different(diff) => diff.to_string(),
        }
    }

    pub fn difference(&self) -> Option<&Difference> {
        match self {
            Self::Same => None,
            Self::Different(diff) => Some(diff),
        }
    }

    /// Splits into `(reason, same)`
    pub fn into_parts(self) -> (String, bool) {
        let same = self.is_same();
        (self.reason(), same)
    }
}

impl From<Option<Difference>> for Verdict {
    fn from(diff: Option<Difference>) -> Self {
        match diff {
            None => Self::Same,
            Some(diff) => Self::Different(diff),
        }
    }
}
