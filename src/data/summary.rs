use std::collections::BTreeMap;

use log::{debug, warn};

use super::model::{CellValue, Table};
use crate::error::{AnalysisError, Result};

/// Name of the percentage column in [`ProportionSummary::to_table`].
pub const PERCENT_COLUMN: &str = "percent";

/// Percentage of rows per distinct value of one column, in ascending value
/// order. Percentages keep full precision; round only for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionSummary {
    pub column: String,
    pub entries: Vec<(CellValue, f64)>,
}

impl ProportionSummary {
    pub fn percent_of(&self, value: &CellValue) -> Option<f64> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, p)| *p)
    }

    /// Sum of all percentages; 100 up to rounding.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// `(label, "12.34")` pairs for tables and chart annotations.
    pub fn display_rows(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(v, p)| (v.to_string(), format!("{p:.2}")))
            .collect()
    }

    /// The summary as an exportable table: one column with the category
    /// values and one with their percentage.
    pub fn to_table(&self) -> Table {
        Table::new(
            vec![self.column.clone(), PERCENT_COLUMN.to_string()],
            self.entries
                .iter()
                .map(|(v, p)| vec![v.clone(), CellValue::Float(*p)])
                .collect(),
        )
    }
}

/// Normalized frequency of each non-missing value of `column`, as
/// percentages. Missing values are left out of the denominator.
pub fn summarize(table: &Table, column: &str) -> Result<ProportionSummary> {
    if table.is_empty() {
        return Err(AnalysisError::EmptyTable);
    }

    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in table.column_values(column)?.filter(|v| !v.is_missing()) {
        *counts.entry(value).or_default() += 1;
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return Err(AnalysisError::EmptyTable);
    }

    let entries = counts
        .into_iter()
        .map(|(v, n)| (v.clone(), n as f64 / total as f64 * 100.0))
        .collect();
    debug!("summarized '{column}' over {total} values");
    Ok(ProportionSummary {
        column: column.to_string(),
        entries,
    })
}

// ---------------------------------------------------------------------------
// Raw vs. filtered proportions
// ---------------------------------------------------------------------------

/// Target proportions before and after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetProportions {
    pub raw: ProportionSummary,
    pub filtered: ProportionSummary,
    /// Set when the filtered table had no target values to count and
    /// `filtered` is a copy of `raw`.
    pub fallback: bool,
}

/// Summarize both tables. When the filtered table has no rows, or only
/// missing target values, the raw summary is reported for it and `fallback`
/// is set.
pub fn summarize_with_fallback(
    raw: &Table,
    filtered: &Table,
    column: &str,
) -> Result<TargetProportions> {
    let raw_summary = summarize(raw, column)?;
    match summarize(filtered, column) {
        Ok(filtered) => Ok(TargetProportions {
            filtered,
            raw: raw_summary,
            fallback: false,
        }),
        Err(AnalysisError::EmptyTable) => {
            warn!(
                "No '{column}' values in {} filtered rows; reporting the unfiltered proportions",
                filtered.len()
            );
            Ok(TargetProportions {
                filtered: raw_summary.clone(),
                raw: raw_summary,
                fallback: true,
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(values: &[&str]) -> Table {
        Table::new(
            vec!["y".into()],
            values.iter().map(|v| vec![CellValue::from(*v)]).collect(),
        )
    }

    #[test]
    fn percentages_are_sorted_by_value() {
        let s = summarize(&targets(&["yes", "no", "no", "yes", "no"]), "y").unwrap();
        let labels: Vec<_> = s.entries.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(labels, ["no", "yes"]);
        assert!((s.percent_of(&"no".into()).unwrap() - 60.0).abs() < 1e-9);
        assert!((s.percent_of(&"yes".into()).unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let s = summarize(&targets(&["a", "b", "c", "a", "b", "a", "c"]), "y").unwrap();
        assert!((s.total() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn missing_values_are_excluded_from_the_denominator() {
        let t = Table::new(
            vec!["y".into()],
            vec![
                vec!["yes".into()],
                vec![CellValue::Missing],
                vec!["no".into()],
            ],
        );
        let s = summarize(&t, "y").unwrap();
        assert_eq!(s.entries.len(), 2);
        assert!((s.percent_of(&"yes".into()).unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_table_is_an_error() {
        assert!(matches!(
            summarize(&targets(&[]), "y"),
            Err(AnalysisError::EmptyTable)
        ));
    }

    #[test]
    fn display_rounds_to_two_decimals() {
        let s = summarize(&targets(&["a", "b", "b"]), "y").unwrap();
        assert_eq!(
            s.display_rows(),
            vec![
                ("a".to_string(), "33.33".to_string()),
                ("b".to_string(), "66.67".to_string())
            ]
        );
    }

    #[test]
    fn summary_table_keeps_categories_and_precision() {
        let s = summarize(&targets(&["a", "b", "b"]), "y").unwrap();
        let t = s.to_table();
        assert_eq!(t.columns(), ["y", PERCENT_COLUMN]);
        assert_eq!(t.value(1, "y"), Some(&CellValue::from("b")));
        assert_eq!(
            t.value(1, PERCENT_COLUMN),
            Some(&CellValue::Float(2.0 / 3.0 * 100.0))
        );
    }

    #[test]
    fn empty_filtered_table_falls_back_to_raw() {
        let raw = targets(&["yes", "no", "no", "yes", "no"]);
        let filtered = targets(&[]);
        let p = summarize_with_fallback(&raw, &filtered, "y").unwrap();
        assert!(p.fallback);
        assert_eq!(p.filtered, p.raw);
    }

    #[test]
    fn filtered_rows_without_targets_fall_back_to_raw() {
        let raw = targets(&["yes", "no", "no", "yes", "no"]);
        let filtered = Table::new(vec!["y".into()], vec![vec![CellValue::Missing]]);
        let p = summarize_with_fallback(&raw, &filtered, "y").unwrap();
        assert!(p.fallback);
        assert_eq!(p.filtered, p.raw);
    }

    #[test]
    fn mixed_numbers_form_one_ordered_domain() {
        let t = Table::new(
            vec!["y".into()],
            vec![
                vec![CellValue::Integer(2)],
                vec![CellValue::Float(1.5)],
                vec![CellValue::Integer(1)],
                vec![CellValue::Float(1.0)],
            ],
        );
        let s = summarize(&t, "y").unwrap();
        assert_eq!(
            s.display_rows(),
            vec![
                ("1".to_string(), "50.00".to_string()),
                ("1.5".to_string(), "25.00".to_string()),
                ("2".to_string(), "25.00".to_string()),
            ]
        );
    }

    #[test]
    fn non_empty_filtered_table_is_summarized_itself() {
        let raw = targets(&["yes", "no", "no", "yes", "no"]);
        let filtered = targets(&["yes"]);
        let p = summarize_with_fallback(&raw, &filtered, "y").unwrap();
        assert!(!p.fallback);
        assert_eq!(p.filtered.entries, vec![(CellValue::from("yes"), 100.0)]);
    }
}
