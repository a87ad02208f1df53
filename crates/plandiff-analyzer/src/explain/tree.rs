//! Tree reconstruction from box-drawing glyphs
//!
//! The id column draws the tree:
//!
//! ```text
//! HashJoin_7
//! ├─TableReader_9
//! │ └─TableFullScan_8
//! └─TableReader_12
//!   └─Selection_11
//!     └─TableFullScan_10
//! ```
//!
//! A parent's children are the rows below it carrying `├` or `└` in the
//! column where the parent's name starts. Glyphs are multi-byte, so every
//! offset here is a `char` index.

use crate::error::{ExplainError, FormatError, Result};

const VERTICAL: char = '│';
const BRANCH: char = '├';
const LAST_BRANCH: char = '└';
const HORIZONTAL: char = '─';

/// Row-number tree produced from the id column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeNode {
    pub row: usize,
    pub children: Vec<ShapeNode>,
}

impl ShapeNode {
    fn leaf(row: usize) -> Self {
        Self {
            row,
            children: Vec::new(),
        }
    }

    /// Row numbers in pre-order
    pub fn rows(&self) -> Vec<usize> {
        let mut rows = Vec::new();
        self.collect_rows(&mut rows);
        rows
    }

    fn collect_rows(&self, rows: &mut Vec<usize>) {
        rows.push(self.row);
        for child in &self.children {
            child.collect_rows(rows);
        }
    }
}

/// Code-point offset of the first alphabetic character, `None` for a leaf
pub fn anchor_column(field: &[char]) -> Option<usize> {
    field.iter().position(|c| c.is_alphabetic())
}

/// Direct children of `parent`, in row order
pub fn find_child_rows(id_fields: &[Vec<char>], parent: usize) -> Vec<usize> {
    let Some(col) = id_fields.get(parent).and_then(|field| anchor_column(field)) else {
        return Vec::new();
    };

    let mut children = Vec::with_capacity(2);
    for (row, field) in id_fields.iter().enumerate().skip(parent + 1) {
        match field.get(col) {
            Some(&BRANCH) | Some(&LAST_BRANCH) => children.push(row),
            Some(&VERTICAL) => {}
            _ => break,
        }
    }
    children
}

/// Builds the row tree rooted at row 0
///
/// Every row must be reachable from the root; a second top-level operator or
/// an orphaned glyph row is reported as [`FormatError::DetachedRow`].
pub fn build_shape(id_fields: &[Vec<char>]) -> Result<ShapeNode> {
    if id_fields.is_empty() {
        return Err(FormatError::EmptyPlan.into());
    }

    let root = build_subtree(id_fields, 0);

    // Each row must be claimed exactly once.
    let mut seen = vec![false; id_fields.len()];
    for row in root.rows() {
        if std::mem::replace(&mut seen[row], true) {
            return Err(detached(id_fields, row));
        }
    }
    if let Some(row) = seen.iter().position(|claimed| !claimed) {
        return Err(detached(id_fields, row));
    }

    Ok(root)
}

fn detached(id_fields: &[Vec<char>], row: usize) -> ExplainError {
    let field: String = id_fields[row].iter().collect();
    FormatError::DetachedRow {
        row,
        id: extract_operator_id(&field),
    }
    .into()
}

fn build_subtree(id_fields: &[Vec<char>], row: usize) -> ShapeNode {
    let mut node = ShapeNode::leaf(row);
    node.children = find_child_rows(id_fields, row)
        .into_iter()
        .map(|child| build_subtree(id_fields, child))
        .collect();
    node
}

/// Strips tree glyphs and padding, leaving the operator id
pub fn extract_operator_id(field: &str) -> String {
    field
        .trim_matches(|c: char| {
            c == LAST_BRANCH || c == HORIZONTAL || c == VERTICAL || c == BRANCH || c == ' '
        })
        .to_string()
}
