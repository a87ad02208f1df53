//! Plan comparator implementation
//!
//! Walks two operator trees in pre-order and stops at the first difference.
//! Estimated row counts are never compared: they drift with statistics even
//! when the plan itself is stable.

use tracing::debug;

use crate::explain::plan::{Operator, OperatorDetail, Plan};

use super::diff::{Difference, Verdict};

/// Configuration for plan comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareConfig {
    /// Whether plans for different statements count as different
    pub compare_sql: bool,
    /// Whether operators must run on the same execution tier
    pub compare_task_locations: bool,
    /// Whether joins must agree on their join kind
    pub compare_join_types: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            compare_sql: true,
            compare_task_locations: true,
            compare_join_types: false,
        }
    }
}

impl CompareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares operator trees even when the statements differ
    pub fn without_sql(mut self) -> Self {
        self.compare_sql = false;
        self
    }

    /// Ignores which tier each operator runs on
    pub fn without_task_locations(mut self) -> Self {
        self.compare_task_locations = false;
        self
    }

    /// Also requires joins to have the same join kind
    pub fn with_join_types(mut self) -> Self {
        self.compare_join_types = true;
        self
    }
}

/// Structural comparator for parsed plans
#[derive(Debug, Clone, Default)]
pub struct PlanComparator {
    config: CompareConfig,
}

impl PlanComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compares two plans, reporting the first difference
    pub fn compare(&self, p1: &Plan, p2: &Plan) -> Verdict {
        if self.config.compare_sql && p1.sql() != p2.sql() {
            debug!("plans explain different statements");
            return Verdict::Different(Difference::SqlText {
                left: p1.sql().to_string(),
                right: p2.sql().to_string(),
            });
        }

        self.compare_operators(p1.root(), p2.root())
    }

    /// Compares two operator subtrees
    pub fn compare_operators(&self, op1: &Operator, op2: &Operator) -> Verdict {
        let diff = self.first_difference(op1, op2);
        if let Some(diff) = &diff {
            if let Some((left, right)) = diff.operator_ids() {
                debug!(left = %left, right = %right, reason = %diff, "plans differ");
            }
        }
        diff.into()
    }

    fn first_difference(&self, op1: &Operator, op2: &Operator) -> Option<Difference> {
        if let Some(diff) = self.node_difference(op1, op2) {
            return Some(diff);
        }

        op1.children()
            .iter()
            .zip(op2.children())
            .find_map(|(c1, c2)| self.first_difference(c1, c2))
    }

    /// Differences on the node itself, children excluded
    fn node_difference(&self, op1: &Operator, op2: &Operator) -> Option<Difference> {
        let left_id = || op1.id().to_string();
        let right_id = || op2.id().to_string();

        if op1.op_type() != op2.op_type() {
            return Some(Difference::OperatorType {
                left_id: left_id(),
                right_id: right_id(),
                left: op1.op_type(),
                right: op2.op_type(),
            });
        }

        if self.config.compare_task_locations && op1.task() != op2.task() {
            return Some(Difference::TaskLocation {
                left_id: left_id(),
                right_id: right_id(),
                left: op1.task(),
                right: op2.task(),
            });
        }

        if op1.children().len() != op2.children().len() {
            return Some(Difference::ChildCount {
                left_id: left_id(),
                right_id: right_id(),
                left: op1.children().len(),
                right: op2.children().len(),
            });
        }

        match (op1.detail(), op2.detail()) {
            (OperatorDetail::TableScan { table: t1 }, OperatorDetail::TableScan { table: t2 })
                if t1 != t2 =>
            {
                Some(Difference::Table {
                    left_id: left_id(),
                    right_id: right_id(),
                    left: t1.clone(),
                    right: t2.clone(),
                })
            }
            (
                OperatorDetail::IndexScan {
                    table: t1,
                    index: i1,
                },
                OperatorDetail::IndexScan {
                    table: t2,
                    index: i2,
                },
            ) => {
                if t1 != t2 {
                    Some(Difference::Table {
                        left_id: left_id(),
                        right_id: right_id(),
                        left: t1.clone(),
                        right: t2.clone(),
                    })
                } else if i1 != i2 {
                    Some(Difference::Index {
                        left_id: left_id(),
                        right_id: right_id(),
                        left: i1.clone(),
                        right: i2.clone(),
                    })
                } else {
                    None
                }
            }
            (OperatorDetail::Join { join_type: j1 }, OperatorDetail::Join { join_type: j2 })
                if self.config.compare_join_types && j1 != j2 =>
            {
                Some(Difference::JoinType {
                    left_id: left_id(),
                    right_id: right_id(),
                    left: *j1,
                    right: *j2,
                })
            }
            _ => None,
        }
    }
}

/// Compares two plans with the default configuration
pub fn compare(p1: &Plan, p2: &Plan) -> Verdict {
    PlanComparator::new().compare(p1, p2)
}
