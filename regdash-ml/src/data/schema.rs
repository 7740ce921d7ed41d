//! Column typing, feature statistics and single-row input handling.

use crate::data::table::{DataTable, FeatureTable, FeatureValue};
use serde::{Deserialize, Serialize};

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Categorical,
    /// Every value is missing.
    Empty,
}

/// Infer column type from a sample of values. A column is numeric only when
/// every non-missing value is a number.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a FeatureValue>) -> ColumnType {
    let mut has_number = false;
    for v in values {
        match v {
            FeatureValue::Category(_) => return ColumnType::Categorical,
            FeatureValue::Number(_) => has_number = true,
            FeatureValue::Missing => {}
        }
    }
    if has_number {
        ColumnType::Numeric
    } else {
        ColumnType::Empty
    }
}

/// Column names paired with their inferred type, in table order.
pub fn infer_schema(table: &DataTable) -> Vec<(String, ColumnType)> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let dtype = infer_column_type(table.rows.iter().map(|row| &row[i]));
            (name.clone(), dtype)
        })
        .collect()
}

pub fn numerical_features(table: &DataTable) -> Vec<String> {
    columns_of_type(table, ColumnType::Numeric)
}

pub fn categorical_features(table: &DataTable) -> Vec<String> {
    columns_of_type(table, ColumnType::Categorical)
}

fn columns_of_type(table: &DataTable, dtype: ColumnType) -> Vec<String> {
    infer_schema(table)
        .into_iter()
        .filter(|(_, t)| *t == dtype)
        .map(|(name, _)| name)
        .collect()
}

/// Sorted distinct categories of a column, missing values excluded.
pub fn category_values(table: &DataTable, column: &str) -> Vec<String> {
    let mut values: Vec<String> = table
        .column(column)
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_category().map(str::to_string))
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); zero for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Statistics for every numeric column with at least one value.
pub fn feature_stats(table: &DataTable) -> Vec<FeatureStats> {
    numerical_features(table)
        .into_iter()
        .filter_map(|name| {
            let values: Vec<f64> = table
                .column(&name)?
                .filter_map(FeatureValue::as_number)
                .collect();
            column_stats(name, &values)
        })
        .collect()
}

fn column_stats(name: String, values: &[f64]) -> Option<FeatureStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() < 2 {
        0.0
    } else {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(FeatureStats {
        name,
        count: values.len(),
        mean,
        std,
        min,
        max,
    })
}

/// Outcome of checking user input against the held-out ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputValidation {
    pub is_valid: bool,
    pub message: String,
}

/// Check numeric inputs against each feature's observed `[min, max]`.
///
/// Stops at the first out-of-range value. Categorical inputs and features
/// without statistics are not checked.
pub fn validate_input(
    values: &[(String, FeatureValue)],
    stats: &[FeatureStats],
) -> InputValidation {
    for (feature, value) in values {
        let (Some(v), Some(s)) = (value.as_number(), stats.iter().find(|s| &s.name == feature))
        else {
            continue;
        };
        if v < s.min || v > s.max {
            return InputValidation {
                is_valid: false,
                message: format!(
                    "{feature} value {v} is outside range [{}, {}]",
                    s.min, s.max
                ),
            };
        }
    }
    InputValidation {
        is_valid: true,
        message: "All inputs are valid".to_string(),
    }
}

/// Build a one-row feature table in `reference` column order.
///
/// Features absent from `values` start from the first reference row. Numeric
/// defaults are clamped to the column's observed `[min, max]`; a missing
/// numeric cell falls back to the column minimum. Entries naming unknown
/// features are ignored.
pub fn prepare_sample_input(
    values: &[(String, FeatureValue)],
    reference: &FeatureTable,
) -> FeatureTable {
    let first = reference.rows.first();
    let row = infer_schema(reference)
        .iter()
        .enumerate()
        .map(|(i, (name, dtype))| {
            if let Some((_, v)) = values.iter().find(|(k, _)| k == name) {
                return v.clone();
            }
            let default = first.map_or(FeatureValue::Missing, |row| row[i].clone());
            match dtype {
                ColumnType::Numeric => numeric_default(reference, i, default.as_number()),
                _ => default,
            }
        })
        .collect();

    let mut table = DataTable::new(reference.columns.clone());
    table.rows.push(row);
    table
}

fn numeric_default(reference: &FeatureTable, index: usize, first: Option<f64>) -> FeatureValue {
    let (min, max) = reference
        .rows
        .iter()
        .filter_map(|row| row[index].as_number())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return FeatureValue::Missing;
    }
    FeatureValue::Number(first.map_or(min, |v| v.clamp(min, max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reference() -> DataTable {
        let mut t = DataTable::new(vec!["temp".into(), "day".into(), "holiday".into()]);
        for (temp, day) in [(270.0, "Monday"), (290.0, "Friday"), (280.0, "Monday")] {
            t.push_row(vec![
                FeatureValue::Number(temp),
                FeatureValue::Category(day.into()),
                FeatureValue::Missing,
            ])
            .unwrap();
        }
        t
    }

    #[test]
    fn test_infer_schema() {
        let schema = infer_schema(&reference());
        assert_eq!(
            schema,
            vec![
                ("temp".to_string(), ColumnType::Numeric),
                ("day".to_string(), ColumnType::Categorical),
                ("holiday".to_string(), ColumnType::Empty),
            ]
        );
        assert_eq!(numerical_features(&reference()), vec!["temp"]);
        assert_eq!(categorical_features(&reference()), vec!["day"]);
    }

    #[test]
    fn test_category_values_sorted_distinct() {
        assert_eq!(category_values(&reference(), "day"), vec!["Friday", "Monday"]);
        assert!(category_values(&reference(), "nope").is_empty());
    }

    #[test]
    fn test_feature_stats() {
        let stats = feature_stats(&reference());
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, 280.0);
        assert_eq!(s.std, 10.0);
        assert_eq!((s.min, s.max), (270.0, 290.0));
    }

    #[test]
    fn test_validate_input_reports_first_violation() {
        let stats = feature_stats(&reference());
        let ok = validate_input(&[("temp".into(), FeatureValue::Number(275.0))], &stats);
        assert!(ok.is_valid);
        assert_eq!(ok.message, "All inputs are valid");

        let bad = validate_input(
            &[
                ("day".into(), FeatureValue::Category("Sunday".into())),
                ("temp".into(), FeatureValue::Number(300.0)),
            ],
            &stats,
        );
        assert!(!bad.is_valid);
        assert_eq!(bad.message, "temp value 300 is outside range [270, 290]");
    }

    #[test]
    fn test_prepare_sample_input_fills_from_first_row() {
        let sample = prepare_sample_input(
            &[("day".into(), FeatureValue::Category("Friday".into()))],
            &reference(),
        );
        assert_eq!(sample.columns, reference().columns);
        assert_eq!(
            sample.rows,
            vec![vec![
                FeatureValue::Number(270.0),
                FeatureValue::Category("Friday".into()),
                FeatureValue::Missing,
            ]]
        );

        let sample = prepare_sample_input(&[], &reference());
        assert_eq!(sample.rows[0][1], FeatureValue::Category("Monday".into()));
    }

    #[test]
    fn test_prepare_sample_input_missing_first_cell_uses_minimum() {
        let mut t = reference();
        t.rows[0][0] = FeatureValue::Missing;
        let sample = prepare_sample_input(&[], &t);
        assert_eq!(sample.rows[0][0], FeatureValue::Number(280.0));
    }

    #[test]
    fn test_prepare_sample_input_empty_reference() {
        let t = DataTable::new(vec!["temp".into()]);
        let sample = prepare_sample_input(&[], &t);
        assert_eq!(sample.rows, vec![vec![FeatureValue::Missing]]);
    }
}
