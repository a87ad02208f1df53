//! Plan assembly
//!
//! Turns split report rows into a [`Plan`]. The same code serves every
//! dialect; [`ColumnIndexes`] says where each field lives.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{FormatError, Result};
use crate::explain::classify::{
    index_name, match_op_type, parse_join_type, parse_task_type, split_kvs,
};
use crate::explain::dialect::ColumnIndexes;
use crate::explain::plan::{OpType, Operator, OperatorDetail, Plan, PlanVersion};
use crate::explain::tree::{ShapeNode, build_shape, extract_operator_id};

/// Assembles a plan from split rows
pub fn assemble(
    version: PlanVersion,
    columns: &ColumnIndexes,
    sql: &str,
    rows: &[Vec<String>],
) -> Result<Plan> {
    for (row, fields) in rows.iter().enumerate() {
        if fields.len() != columns.width {
            return Err(FormatError::ColumnCount {
                row,
                expected: columns.width,
                found: fields.len(),
            }
            .into());
        }
    }

    let id_fields: Vec<Vec<char>> = rows
        .iter()
        .map(|fields| fields[columns.id].chars().collect())
        .collect();
    let shape = build_shape(&id_fields)?;

    let mut seen = HashSet::with_capacity(rows.len());
    let root = build_operator(&shape, rows, columns, &mut seen)?;

    let plan = Plan::new(normalize_sql(sql), version, root);
    debug!(
        version = %version,
        operators = plan.operator_count(),
        root = %plan.root().id(),
        "assembled plan"
    );
    Ok(plan)
}

fn build_operator(
    node: &ShapeNode,
    rows: &[Vec<String>],
    columns: &ColumnIndexes,
    seen: &mut HashSet<String>,
) -> Result<Operator> {
    let op = parse_operator(&rows[node.row], columns)?;
    if !seen.insert(op.id().to_string()) {
        return Err(FormatError::DuplicateOperatorId(op.id().to_string()).into());
    }

    let children = node
        .children
        .iter()
        .map(|child| build_operator(child, rows, columns, seen))
        .collect::<Result<Vec<_>>>()?;

    Ok(op.with_children(children))
}

/// Classifies one row, without its children
fn parse_operator(fields: &[String], columns: &ColumnIndexes) -> Result<Operator> {
    let id = extract_operator_id(&fields[columns.id]);

    let op_type = match_op_type(&id);
    if op_type == OpType::Unknown {
        debug!(operator = %id, "unrecognized operator");
    }

    let task = parse_task_type(&fields[columns.task]);
    let est_rows = parse_est_rows(&id, &fields[columns.est_rows])?;

    let detail = match op_type {
        OpType::HashJoin | OpType::IndexJoin | OpType::MergeJoin => OperatorDetail::Join {
            join_type: parse_join_type(&fields[columns.operator_info]),
        },
        OpType::TableScan => {
            let kvs = split_kvs(&fields[columns.scan_attributes()]);
            OperatorDetail::TableScan {
                table: kvs.get("table").cloned().unwrap_or_default(),
            }
        }
        OpType::IndexScan => {
            let kvs = split_kvs(&fields[columns.scan_attributes()]);
            OperatorDetail::IndexScan {
                table: kvs.get("table").cloned().unwrap_or_default(),
                index: kvs
                    .get("index")
                    .map(|value| index_name(value).to_string())
                    .unwrap_or_default(),
            }
        }
        _ => OperatorDetail::Plain,
    };

    Ok(Operator::new(id, op_type, est_rows, task).with_detail(detail))
}

/// Parses an estimate such as `10000.00`
///
/// Operators without an estimate (DML roots) print `N/A`; those count as 0.
fn parse_est_rows(id: &str, value: &str) -> Result<f64> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("n/a") {
        return Ok(0.0);
    }

    match value.parse::<f64>() {
        Ok(rows) if rows >= 0.0 && rows.is_finite() => Ok(rows),
        _ => Err(FormatError::InvalidRowCount {
            id: id.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}

/// Trims the statement and drops its trailing `;`
pub fn normalize_sql(sql: &str) -> String {
    let sql = sql.trim();
    sql.strip_suffix(';').unwrap_or(sql).trim().to_string()
}
