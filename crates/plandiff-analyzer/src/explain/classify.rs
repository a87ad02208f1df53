//! Operator classification
//!
//! Operator names change between database releases (`TableScan` became
//! `TableFullScan`/`TableRangeScan`, `IndexLookUp` gained a reader prefix,
//! and so on), so classification is by keyword rather than exact name. An
//! operator nothing matches is `Unknown`, never an error.

use std::collections::HashMap;

use crate::explain::plan::{JoinType, OpType, TaskType};

/// Classifies an operator id such as `IndexHashJoin_7`
///
/// Families are tried in a fixed order and the first family that matches
/// decides the result: an id containing both "index" and "join" is a join.
pub fn match_op_type(operator_id: &str) -> OpType {
    let x = operator_id.to_lowercase();

    if x.contains("join") {
        return if x.contains("hash") {
            OpType::HashJoin
        } else if x.contains("merge") {
            OpType::MergeJoin
        } else if x.contains("index") {
            OpType::IndexJoin
        } else {
            OpType::Unknown
        };
    }

    if x.contains("table") {
        return if x.contains("reader") {
            OpType::TableReader
        } else if x.contains("scan") {
            OpType::TableScan
        } else {
            OpType::Unknown
        };
    }

    if x.contains("index") {
        return if x.contains("reader") {
            OpType::IndexReader
        } else if x.contains("scan") {
            OpType::IndexScan
        } else if x.contains("lookup") {
            OpType::IndexLookup
        } else {
            OpType::Unknown
        };
    }

    if x.contains("selection") {
        OpType::Selection
    } else if x.contains("projection") {
        OpType::Projection
    } else if x.contains("point") {
        OpType::PointGet
    } else {
        OpType::Unknown
    }
}

/// Classifies the task column (`root`, `cop[tikv]`, `mpp[tiflash]`, ...)
pub fn parse_task_type(task: &str) -> TaskType {
    let task = task.trim().to_lowercase();
    if task == "root" {
        TaskType::Root
    } else if task.contains("tiflash") {
        TaskType::ColumnarEngine
    } else {
        TaskType::StorageEngine
    }
}

/// Parses `key:value` pairs separated by commas
///
/// Entries that do not split into exactly one key and one value are
/// dropped; `range:[1,2]` loses its second half and `a:b:c` is skipped.
pub fn split_kvs(s: &str) -> HashMap<String, String> {
    s.split(',')
        .filter_map(|entry| {
            let fields: Vec<&str> = entry.split(':').collect();
            match fields.as_slice() {
                [key, value] => Some((key.trim().to_string(), value.trim().to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Reads the join kind from the leading entry of a join's operator info
///
/// `left outer semi join, equal:[eq(t1.a, t2.a)]` gives
/// [`JoinType::LeftOuterSemi`]. Cartesian products print a `CARTESIAN`
/// prefix, which does not change the kind.
pub fn parse_join_type(operator_info: &str) -> Option<JoinType> {
    let kind = operator_info.split(',').next()?.trim().to_lowercase();
    let kind = kind.strip_prefix("cartesian ").unwrap_or(&kind);
    let kind = kind.strip_suffix("join").unwrap_or(kind).trim();

    match kind {
        "inner" => Some(JoinType::Inner),
        "left outer" => Some(JoinType::LeftOuter),
        "right outer" => Some(JoinType::RightOuter),
        "semi" => Some(JoinType::Semi),
        "anti semi" => Some(JoinType::AntiSemi),
        "left outer semi" => Some(JoinType::LeftOuterSemi),
        "anti left outer semi" => Some(JoinType::AntiLeftOuterSemi),
        _ => None,
    }
}

/// Index name without the column list V4 appends (`idx_ab(a, b)` -> `idx_ab`)
pub fn index_name(value: &str) -> &str {
    value.split('(').next().unwrap_or(value).trim()
}
