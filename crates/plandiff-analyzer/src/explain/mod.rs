//! EXPLAIN Report Parser Module
//!
//! Turns the bordered, tree-drawn report printed by `EXPLAIN` into a typed
//! [`Plan`]. Two report dialects are understood:
//! - V3 (`id | count | task | operator info`)
//! - V4 (`id | estRows | task | access object | operator info`)
//!
//! # Example
//!
//! ```
//! use plandiff_analyzer::explain::{parse_text, OpType, TaskType};
//!
//! let report = "\
//! +---------------------+----------+-----------+---------------+--------------------------------+
//! | id                  | estRows  | task      | access object | operator info                  |
//! +---------------------+----------+-----------+---------------+--------------------------------+
//! | TableReader_5       | 10000.00 | root      |               | data:TableFullScan_4           |
//! | └─TableFullScan_4   | 10000.00 | cop[tikv] | table:t       | keep order:false, stats:pseudo |
//! +---------------------+----------+-----------+---------------+--------------------------------+";
//!
//! let plan = parse_text("select * from t;", report).unwrap();
//! assert_eq!(plan.sql(), "select * from t");
//! assert_eq!(plan.root().op_type(), OpType::TableReader);
//! assert_eq!(plan.root().children()[0].table(), Some("t"));
//! assert_eq!(plan.root().children()[0].task(), TaskType::StorageEngine);
//! ```

pub mod assemble;
pub mod classify;
pub mod dialect;
pub mod plan;
pub mod table;
pub mod tree;

use tracing::debug;

use crate::error::Result;

pub use assemble::{assemble, normalize_sql};
pub use classify::{index_name, match_op_type, parse_join_type, parse_task_type, split_kvs};
pub use dialect::{
    ColumnField, ColumnIndexes, ColumnLayout, ColumnSpec, ParserConfig, identify_version,
    match_version,
};
pub use plan::{
    JoinType, OpType, Operator, OperatorDetail, OperatorIter, Plan, PlanVersion, TaskType,
};
pub use table::{ExplainTable, extract_table, is_border_line, split_header, split_row, split_rows};
pub use tree::{ShapeNode, anchor_column, build_shape, extract_operator_id, find_child_rows};

/// EXPLAIN parser bound to a set of column layouts
#[derive(Debug, Clone, Default)]
pub struct PlanParser {
    config: ParserConfig,
}

impl PlanParser {
    /// Creates a parser with the built-in V3/V4 layouts
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a pasted EXPLAIN report
    ///
    /// The dialect comes from the header row and columns are located by
    /// name, so extra columns (e.g. from EXPLAIN ANALYZE) are tolerated.
    pub fn parse_text(&self, sql: &str, explain_text: &str) -> Result<Plan> {
        let table = extract_table(explain_text)?;
        let version = identify_version(table.header());
        let header = split_header(table.header())?;
        let rows = split_rows(table.body())?;
        debug!(version = %version, rows = rows.len(), "parsing explain report");

        let columns = self.config.layout(version).resolve(&header)?;
        assemble(version, &columns, sql, &rows)
    }

    /// Parses rows that were already split into columns
    ///
    /// `version` is the database version string (e.g. `5.7.25-TiDB-v4.0.0`);
    /// columns are taken positionally from the dialect's layout.
    pub fn parse_rows(&self, version: &str, sql: &str, rows: &[Vec<String>]) -> Result<Plan> {
        let version = match_version(version)?;
        debug!(version = %version, rows = rows.len(), "parsing explain rows");

        let columns = self.config.layout(version).positional()?;
        assemble(version, &columns, sql, rows)
    }
}

/// Parses a pasted EXPLAIN report with the default layouts
pub fn parse_text(sql: &str, explain_text: &str) -> Result<Plan> {
    PlanParser::new().parse_text(sql, explain_text)
}

/// Parses pre-split EXPLAIN rows with the default layouts
pub fn parse_rows(version: &str, sql: &str, rows: &[Vec<String>]) -> Result<Plan> {
    PlanParser::new().parse_rows(version, sql, rows)
}
