//! Plan Model - the typed operator tree rebuilt from an EXPLAIN report
//!
//! Both report dialects converge on this model. A [`Plan`] is assembled once
//! by the parser and is read-only afterwards: fields are private and only
//! exposed through accessors.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExplainError, FormatError};

/// Report dialect, tied to the database version that produced the report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanVersion {
    /// `id | count | task | operator info`
    V3,
    /// `id | estRows | task | access object | operator info`
    V4,
}

impl PlanVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V3 => "v3",
            Self::V4 => "v4",
        }
    }
}

impl fmt::Display for PlanVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanVersion {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::dialect::match_version(s)
    }
}

/// A parsed execution plan paired with the statement it explains
///
/// Deserialization checks the same invariants as parsing: operator ids are
/// unique and every estimate is a finite, non-negative number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "PlanData")]
pub struct Plan {
    sql: String,
    version: PlanVersion,
    root: Operator,
}

/// Unchecked serialized form of [`Plan`]
#[derive(Deserialize)]
struct PlanData {
    sql: String,
    version: PlanVersion,
    root: Operator,
}

impl TryFrom<PlanData> for Plan {
    type Error = FormatError;

    fn try_from(data: PlanData) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for op in data.root.iter() {
            if !op.est_rows.is_finite() || op.est_rows < 0.0 {
                return Err(FormatError::InvalidRowCount {
                    id: op.id.clone(),
                    value: op.est_rows.to_string(),
                });
            }
            if !seen.insert(op.id.as_str()) {
                return Err(FormatError::DuplicateOperatorId(op.id.clone()));
            }
        }

        Ok(Plan::new(data.sql, data.version, data.root))
    }
}

impl Plan {
    pub(crate) fn new(sql: impl Into<String>, version: PlanVersion, root: Operator) -> Self {
        Self {
            sql: sql.into(),
            version,
            root,
        }
    }

    /// Normalized statement text (no surrounding whitespace, no trailing `;`)
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn version(&self) -> PlanVersion {
        self.version
    }

    pub fn root(&self) -> &Operator {
        &self.root
    }

    /// Returns an iterator over all operators in the plan (pre-order)
    pub fn iter_operators(&self) -> OperatorIter<'_> {
        self.root.iter()
    }

    /// Finds the operator with the given id
    pub fn find_operator(&self, id: &str) -> Option<&Operator> {
        self.iter_operators().find(|op| op.id == id)
    }

    /// Finds all operators of a specific type
    pub fn find_operators_by_type(&self, op_type: OpType) -> Vec<&Operator> {
        self.iter_operators()
            .filter(|op| op.op_type == op_type)
            .collect()
    }

    /// Returns the number of operators in the plan
    pub fn operator_count(&self) -> usize {
        self.root.node_count()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SQL: {}", self.sql)?;
        self.root.fmt_indented(f, 0)
    }
}

/// A single operator (node) of the plan tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    id: String,
    op_type: OpType,
    est_rows: f64,
    task: TaskType,
    detail: OperatorDetail,
    children: Vec<Operator>,
}

impl Operator {
    pub(crate) fn new(id: impl Into<String>, op_type: OpType, est_rows: f64, task: TaskType) -> Self {
        Self {
            id: id.into(),
            op_type,
            est_rows,
            task,
            detail: OperatorDetail::Plain,
            children: Vec::new(),
        }
    }

    pub(crate) fn with_detail(mut self, detail: OperatorDetail) -> Self {
        self.detail = detail;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_child(mut self, child: Operator) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn with_children(mut self, children: Vec<Operator>) -> Self {
        self.children = children;
        self
    }

    /// Operator id as printed by the database, e.g. `TableReader_5`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn op_type(&self) -> OpType {
        self.op_type
    }

    /// Estimated number of output rows
    pub fn est_rows(&self) -> f64 {
        self.est_rows
    }

    pub fn task(&self) -> TaskType {
        self.task
    }

    pub fn detail(&self) -> &OperatorDetail {
        &self.detail
    }

    pub fn children(&self) -> &[Operator] {
        &self.children
    }

    /// Scanned table, for table and index scans
    pub fn table(&self) -> Option<&str> {
        match &self.detail {
            OperatorDetail::TableScan { table } | OperatorDetail::IndexScan { table, .. } => {
                Some(table)
            }
            _ => None,
        }
    }

    /// Scanned index, for index scans
    pub fn index(&self) -> Option<&str> {
        match &self.detail {
            OperatorDetail::IndexScan { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Join kind, for join operators whose kind was recognized
    pub fn join_type(&self) -> Option<JoinType> {
        match self.detail {
            OperatorDetail::Join { join_type } => join_type,
            _ => None,
        }
    }

    /// Returns an iterator over this subtree (pre-order)
    pub fn iter(&self) -> OperatorIter<'_> {
        OperatorIter::new(self)
    }

    /// Returns the total number of operators in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}\t{}", "", self.id, self.est_rows, indent = indent)?;
        for child in &self.children {
            child.fmt_indented(f, indent + 4)?;
        }
        Ok(())
    }
}

/// Variant-specific attributes of an operator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorDetail {
    /// No attributes beyond the common ones
    #[default]
    Plain,
    Join {
        join_type: Option<JoinType>,
    },
    TableScan {
        table: String,
    },
    IndexScan {
        table: String,
        index: String,
    },
}

/// Closed taxonomy of operator kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    HashJoin,
    IndexJoin,
    MergeJoin,
    TableReader,
    TableScan,
    IndexReader,
    IndexScan,
    IndexLookup,
    Selection,
    Projection,
    PointGet,
    Unknown,
}

impl OpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HashJoin => "HashJoin",
            Self::IndexJoin => "IndexJoin",
            Self::MergeJoin => "MergeJoin",
            Self::TableReader => "TableReader",
            Self::TableScan => "TableScan",
            Self::IndexReader => "IndexReader",
            Self::IndexScan => "IndexScan",
            Self::IndexLookup => "IndexLookup",
            Self::Selection => "Selection",
            Self::Projection => "Projection",
            Self::PointGet => "PointGet",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_join(&self) -> bool {
        matches!(self, Self::HashJoin | Self::IndexJoin | Self::MergeJoin)
    }

    pub fn is_scan(&self) -> bool {
        matches!(self, Self::TableScan | Self::IndexScan)
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution tier an operator runs on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// The coordinating SQL layer
    Root,
    /// The row-oriented storage engine (coprocessor tasks)
    StorageEngine,
    /// The columnar analytical engine
    ColumnarEngine,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::StorageEngine => "storage",
            Self::ColumnarEngine => "columnar",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of join operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    Semi,
    AntiSemi,
    LeftOuterSemi,
    AntiLeftOuterSemi,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::LeftOuter => "left outer join",
            Self::RightOuter => "right outer join",
            Self::Semi => "semi join",
            Self::AntiSemi => "anti semi join",
            Self::LeftOuterSemi => "left outer semi join",
            Self::AntiLeftOuterSemi => "anti left outer semi join",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Iterator for traversing operators depth-first
pub struct OperatorIter<'a> {
    stack: Vec<&'a Operator>,
}

impl<'a> OperatorIter<'a> {
    fn new(root: &'a Operator) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for OperatorIter<'a> {
    type Item = &'a Operator;

    fn next(&mut self) -> Option<Self::Item> {
        let op = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in op.children.iter().rev() {
            self.stack.push(child);
        }
        Some(op)
    }
}
