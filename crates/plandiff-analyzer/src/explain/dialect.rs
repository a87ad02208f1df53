//! Report dialects and their column layouts
//!
//! V3 reports print `id | count | task | operator info`, V4 reports print
//! `id | estRows | task | access object | operator info`. The difference is
//! captured as data ([`ColumnLayout`]) so a single assembler serves both.

use serde::{Deserialize, Serialize};

use crate::error::{ExplainError, FormatError, Result};
use crate::explain::plan::PlanVersion;

/// Picks the report dialect from the header row
pub fn identify_version(header: &str) -> PlanVersion {
    if header.contains("estRows") {
        PlanVersion::V4
    } else {
        PlanVersion::V3
    }
}

/// Maps a free-text database version (e.g. `5.7.25-TiDB-v4.0.0`) to a dialect
pub fn match_version(version: &str) -> Result<PlanVersion> {
    let v = version.to_lowercase();
    if v.contains("v3") {
        Ok(PlanVersion::V3)
    } else if v.contains("v4") {
        Ok(PlanVersion::V4)
    } else {
        Err(ExplainError::UnsupportedVersion(version.to_string()))
    }
}

/// Semantic meaning of a report column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    Id,
    EstRows,
    Task,
    AccessObject,
    OperatorInfo,
    /// Present in the report but unused (e.g. `actRows` in EXPLAIN ANALYZE)
    Other,
}

/// One column of a layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Header text as printed by the database
    pub name: String,
    pub field: ColumnField,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, field: ColumnField) -> Self {
        Self {
            name: name.into(),
            field,
        }
    }
}

/// Ordered column layout of one dialect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnLayout {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// `id | count | task | operator info`
    pub fn v3() -> Self {
        Self::new(vec![
            ColumnSpec::new("id", ColumnField::Id),
            ColumnSpec::new("count", ColumnField::EstRows),
            ColumnSpec::new("task", ColumnField::Task),
            ColumnSpec::new("operator info", ColumnField::OperatorInfo),
        ])
    }

    /// `id | estRows | task | access object | operator info`
    pub fn v4() -> Self {
        Self::new(vec![
            ColumnSpec::new("id", ColumnField::Id),
            ColumnSpec::new("estRows", ColumnField::EstRows),
            ColumnSpec::new("task", ColumnField::Task),
            ColumnSpec::new("access object", ColumnField::AccessObject),
            ColumnSpec::new("operator info", ColumnField::OperatorInfo),
        ])
    }

    /// Column positions taken from the order of the layout itself
    ///
    /// Used for rows that come without a header, e.g. straight from a driver.
    pub fn positional(&self) -> Result<ColumnIndexes> {
        self.indexes(self.columns.len(), |spec| {
            self.columns.iter().position(|c| c == spec)
        })
    }

    /// Column positions looked up by name in a report header
    pub fn resolve(&self, header: &[String]) -> Result<ColumnIndexes> {
        self.indexes(header.len(), |spec| {
            header.iter().position(|name| name == &spec.name)
        })
    }

    fn indexes<F>(&self, width: usize, locate: F) -> Result<ColumnIndexes>
    where
        F: Fn(&ColumnSpec) -> Option<usize>,
    {
        let find = |field: ColumnField| -> Option<usize> {
            self.columns
                .iter()
                .find(|spec| spec.field == field)
                .and_then(|spec| locate(spec))
        };
        let require = |field: ColumnField| -> Result<usize> {
            find(field).ok_or_else(|| {
                let name = self
                    .columns
                    .iter()
                    .find(|spec| spec.field == field)
                    .map(|spec| spec.name.clone())
                    .unwrap_or_else(|| format!("{:?}", field));
                FormatError::MissingColumn(name).into()
            })
        };

        Ok(ColumnIndexes {
            id: require(ColumnField::Id)?,
            est_rows: require(ColumnField::EstRows)?,
            task: require(ColumnField::Task)?,
            access_object: find(ColumnField::AccessObject),
            operator_info: require(ColumnField::OperatorInfo)?,
            width,
        })
    }
}

/// Resolved column positions for one report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndexes {
    pub id: usize,
    pub est_rows: usize,
    pub task: usize,
    /// Only V4 reports have a separate access-object column
    pub access_object: Option<usize>,
    pub operator_info: usize,
    /// Number of columns every row must have
    pub width: usize,
}

impl ColumnIndexes {
    /// Column holding `table:`/`index:` attributes for scans
    pub fn scan_attributes(&self) -> usize {
        self.access_object.unwrap_or(self.operator_info)
    }
}

/// Parser configuration: one column layout per dialect
///
/// ```toml
/// [[v4.columns]]
/// name = "id"
/// field = "id"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    pub v3: ColumnLayout,
    pub v4: ColumnLayout,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            v3: ColumnLayout::v3(),
            v4: ColumnLayout::v4(),
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads layouts from TOML; dialects left out keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Returns the layout for a dialect
    pub fn layout(&self, version: PlanVersion) -> &ColumnLayout {
        match version {
            PlanVersion::V3 => &self.v3,
            PlanVersion::V4 => &self.v4,
        }
    }

    /// Replaces the layout for a dialect
    pub fn with_layout(mut self, version: PlanVersion, layout: ColumnLayout) -> Self {
        match version {
            PlanVersion::V3 => self.v3 = layout,
            PlanVersion::V4 => self.v4 = layout,
        }
        self
    }
}
