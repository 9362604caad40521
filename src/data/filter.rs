use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use log::debug;

use super::model::{CellValue, Table};
use crate::config::AnalysisConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Which values of a categorical column are allowed through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// No restriction.
    #[default]
    All,
    /// Exact set membership. An empty set matches nothing.
    Only(BTreeSet<CellValue>),
}

impl Selection {
    /// Build a selection from a multi-select widget. The "all" pick wins over
    /// any explicit values picked next to it.
    pub fn from_picks(all: bool, values: impl IntoIterator<Item = CellValue>) -> Self {
        if all {
            Selection::All
        } else {
            Selection::Only(values.into_iter().collect())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    fn matches(&self, value: &CellValue) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => !value.is_missing() && set.contains(value),
        }
    }
}

/// Inclusive numeric range over one column.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

// Bounds are hashed bitwise; only used as a cache key.
impl Hash for RangeFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column.hash(state);
        self.min.to_bits().hash(state);
        self.max.to_bits().hash(state);
    }
}

impl Eq for RangeFilter {}

/// Sorted distinct non-missing values of a column: the options offered next
/// to "all" in a multi-select.
pub fn filter_options(table: &Table, column: &str) -> Result<Vec<CellValue>> {
    Ok(table.distinct_values(column)?.into_iter().collect())
}

/// Keep rows where `min <= row[column] <= max`. Values that do not coerce
/// to a number count as missing and are dropped.
pub fn apply_range(table: &Table, column: &str, min: f64, max: f64) -> Result<Table> {
    let col = table.column_index(column)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| {
            row[col]
                .as_number()
                .is_some_and(|v| min <= v && v <= max)
        })
        .cloned()
        .collect();
    Ok(table.derive(rows))
}

/// Keep rows whose value in `column` is a member of `selection`.
/// `Selection::All` returns the rows unchanged.
pub fn apply_selection(table: &Table, column: &str, selection: &Selection) -> Result<Table> {
    let col = table.column_index(column)?;
    if selection.is_all() {
        return Ok(table.clone());
    }
    let rows = table
        .rows()
        .iter()
        .filter(|row| selection.matches(&row[col]))
        .cloned()
        .collect();
    Ok(table.derive(rows))
}

// ---------------------------------------------------------------------------
// FilterSpec: the full set of predicates submitted by the user
// ---------------------------------------------------------------------------

/// A numeric range plus one selection per categorical column, applied as a
/// conjunction in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub range: RangeFilter,
    pub selections: Vec<(String, Selection)>,
}

impl FilterSpec {
    /// The identity filter for `table`: the observed bounds of the range
    /// column and `All` for every categorical column.
    pub fn identity(table: &Table, config: &AnalysisConfig) -> Result<Self> {
        let (min, max) = table
            .numeric_bounds(&config.range_column)?
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        Ok(FilterSpec {
            range: RangeFilter {
                column: config.range_column.clone(),
                min,
                max,
            },
            selections: config
                .categorical_columns
                .iter()
                .map(|c| (c.clone(), Selection::All))
                .collect(),
        })
    }

    /// Replace the selection for one column, keeping its declared position.
    pub fn with_selection(mut self, column: &str, selection: Selection) -> Self {
        match self.selections.iter_mut().find(|(c, _)| c == column) {
            Some((_, s)) => *s = selection,
            None => self.selections.push((column.to_string(), selection)),
        }
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range.min = min;
        self.range.max = max;
        self
    }

    /// Apply the range, then every selection. An empty result is valid.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let mut current = apply_range(table, &self.range.column, self.range.min, self.range.max)?;
        debug!(
            "range {}..={} on '{}': {} -> {} rows",
            self.range.min,
            self.range.max,
            self.range.column,
            table.len(),
            current.len()
        );
        for (column, selection) in &self.selections {
            current = apply_selection(&current, column, selection)?;
        }
        debug!("filters kept {} of {} rows", current.len(), table.len());
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn bank() -> Table {
        let rows = [
            (25, "admin", "married", "yes"),
            (31, "admin", "single", "no"),
            (35, "services", "married", "no"),
            (40, "admin", "married", "yes"),
            (45, "technician", "single", "no"),
        ];
        Table::new(
            vec!["age".into(), "job".into(), "marital".into(), "y".into()],
            rows.iter()
                .map(|&(age, job, marital, y)| {
                    vec![CellValue::Integer(age), job.into(), marital.into(), y.into()]
                })
                .collect(),
        )
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            categorical_columns: vec!["job".into(), "marital".into()],
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let t = apply_range(&bank(), "age", 31.0, 40.0).unwrap();
        let ages: Vec<_> = t.column_values("age").unwrap().cloned().collect();
        assert_eq!(
            ages,
            vec![CellValue::Integer(31), CellValue::Integer(35), CellValue::Integer(40)]
        );
    }

    #[test]
    fn range_drops_missing_and_non_numeric() {
        let t = Table::new(
            vec!["age".into()],
            vec![
                vec![CellValue::Missing],
                vec!["old".into()],
                vec!["33".into()],
                vec![CellValue::Float(33.5)],
            ],
        );
        assert_eq!(apply_range(&t, "age", 0.0, 100.0).unwrap().len(), 2);
    }

    #[test]
    fn all_selection_is_identity() {
        let t = bank();
        assert_eq!(apply_selection(&t, "job", &Selection::All).unwrap(), t);
    }

    #[test]
    fn single_value_selection_keeps_only_that_value() {
        let sel = Selection::Only([CellValue::from("admin")].into_iter().collect());
        let t = apply_selection(&bank(), "job", &sel).unwrap();
        assert_eq!(t.len(), 3);
        assert!(t
            .column_values("job")
            .unwrap()
            .all(|v| *v == CellValue::Text("admin".into())));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let t = apply_selection(&bank(), "job", &Selection::Only(BTreeSet::new())).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.columns(), bank().columns());
    }

    #[test]
    fn missing_never_matches_a_selection() {
        let t = Table::new(vec!["job".into()], vec![vec![CellValue::Missing]]);
        let sel = Selection::Only([CellValue::Missing].into_iter().collect());
        assert!(apply_selection(&t, "job", &sel).unwrap().is_empty());
    }

    #[test]
    fn all_pick_wins_over_explicit_values() {
        assert_eq!(Selection::from_picks(true, [CellValue::from("admin")]), Selection::All);
        assert_eq!(
            Selection::from_picks(false, Vec::new()),
            Selection::Only(BTreeSet::new())
        );
    }

    #[test]
    fn identity_spec_returns_the_table() {
        let t = bank();
        let spec = FilterSpec::identity(&t, &config()).unwrap();
        assert_eq!(spec.range.min, 25.0);
        assert_eq!(spec.range.max, 45.0);
        assert_eq!(spec.apply(&t).unwrap(), t);
    }

    #[test]
    fn spec_is_a_conjunction_preserving_order() {
        let t = bank();
        let spec = FilterSpec::identity(&t, &config())
            .unwrap()
            .with_range(30.0, 45.0)
            .with_selection("marital", Selection::Only([CellValue::from("married")].into_iter().collect()));
        let out = spec.apply(&t).unwrap();
        let ages: Vec<_> = out.column_values("age").unwrap().cloned().collect();
        assert_eq!(ages, vec![CellValue::Integer(35), CellValue::Integer(40)]);
        // The input is untouched.
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn unknown_column_is_reported() {
        let err = apply_selection(&bank(), "salary", &Selection::All).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownColumn(c) if c == "salary"));
    }

    #[test]
    fn options_are_sorted_and_skip_missing() {
        let opts = filter_options(&bank(), "job").unwrap();
        assert_eq!(
            opts,
            vec![
                CellValue::from("admin"),
                CellValue::from("services"),
                CellValue::from("technician")
            ]
        );
    }
}
