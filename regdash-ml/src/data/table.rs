//! In-memory tabular data for the held-out evaluation set.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value. Numbers and categories are kept raw; encoding is the
/// model pipeline's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    Missing,
}

impl FeatureValue {
    /// Parse a raw text cell: empty or NaN is missing, anything numeric is a
    /// number, everything else is a category.
    pub fn parse_cell(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Self::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_nan() => Self::Missing,
            Ok(v) => Self::Number(v),
            Err(_) => Self::Category(s.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Category(s) => f.write_str(s),
            Self::Missing => f.write_str("None"),
        }
    }
}

/// Row-major table with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<FeatureValue>>,
}

/// A table holding only feature columns, ready for `RegressionModel::predict`.
pub type FeatureTable = DataTable;

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<FeatureValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EvalError::dataset(format!(
                "row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the values of one column.
    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = &'a FeatureValue> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Split off the numeric target column, returning the remaining feature
    /// table and the target values in row order.
    pub fn split_target(&self, target: &str) -> Result<(FeatureTable, Vec<f64>)> {
        let idx = self
            .column_index(target)
            .ok_or_else(|| EvalError::dataset(format!("target column '{target}' not found")))?;

        let columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, c)| c.clone())
            .collect();

        let mut features = DataTable::new(columns);
        let mut targets = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let value = row[idx].as_number().ok_or_else(|| {
                EvalError::dataset(format!(
                    "target '{target}' in row {row_idx} is not numeric: {}",
                    row[idx]
                ))
            })?;
            targets.push(value);
            features.rows.push(
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != idx)
                    .map(|(_, v)| v.clone())
                    .collect(),
            );
        }
        Ok((features, targets))
    }
}
