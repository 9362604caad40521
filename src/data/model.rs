use std::collections::{BTreeSet, HashMap};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, inferred per cell at load time.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
///
/// Integers and floats form one numeric domain: `Integer(1) == Float(1.0)`
/// and `Integer(2) > Float(1.5)`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

/// The integer an integral float stands for, if it fits an `i64`.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn cmp_floats(a: f64, b: f64) -> Ordering {
    // `-0.0 == 0.0`; `total_cmp` only breaks ties `partial_cmp` cannot order.
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Integer(_) | Float(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => cmp_floats(*a, *b),
            (Integer(a), Float(b)) => match integral(*b) {
                Some(b) => a.cmp(&b),
                None => cmp_floats(*a as f64, *b),
            },
            (Float(_), Integer(_)) => other.cmp(self).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Missing => 0u8.hash(state),
            CellValue::Integer(i) => (1u8, *i).hash(state),
            CellValue::Float(f) => match integral(*f) {
                Some(i) => (1u8, i).hash(state),
                None => (2u8, f.to_bits()).hash(state),
            },
            CellValue::Text(s) => (3u8, s).hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Coerce the value to `f64` for a numeric comparison.
    ///
    /// Numeric text is parsed; anything else (including NaN) yields `None`
    /// and is treated as missing by the filters.
    pub fn as_number(&self) -> Option<f64> {
        let v = match self {
            CellValue::Integer(i) => *i as f64,
            CellValue::Float(v) => *v,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Missing => return None,
        };
        (!v.is_nan()).then_some(v)
    }
}

// ---------------------------------------------------------------------------
// Table – immutable rows with fixed named columns
// ---------------------------------------------------------------------------

/// An ordered, immutable table. Filters derive new tables; nothing mutates
/// one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    index: HashMap<String, usize>,
}

impl Table {
    /// Build a table. Short rows are padded with `Missing`, long rows are
    /// truncated to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Missing);
                row
            })
            .collect();
        Self::from_parts(columns, rows)
    }

    fn from_parts(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        // First occurrence wins if a caller passes duplicate names.
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Table {
            columns,
            rows,
            index,
        }
    }

    /// Derive a table with the same columns from a subset of rows.
    pub(crate) fn derive(&self, rows: Vec<Vec<CellValue>>) -> Self {
        Table {
            columns: self.columns.clone(),
            rows,
            index: self.index.clone(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| AnalysisError::UnknownColumn(column.to_string()))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = *self.index.get(column)?;
        self.rows.get(row)?.get(col)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let col = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[col]))
    }

    /// Sorted distinct non-missing values of a column.
    pub fn distinct_values(&self, column: &str) -> Result<BTreeSet<CellValue>> {
        Ok(self
            .column_values(column)?
            .filter(|v| !v.is_missing())
            .cloned()
            .collect())
    }

    /// Smallest and largest numeric value of a column, ignoring anything
    /// that does not coerce to a number.
    pub fn numeric_bounds(&self, column: &str) -> Result<Option<(f64, f64)>> {
        Ok(self
            .column_values(column)?
            .filter_map(CellValue::as_number)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            }))
    }

    /// The first `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        self.derive(self.rows.iter().take(n).cloned().collect())
    }

    /// Content hash of the header and every cell.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.columns.hash(&mut hasher);
        self.rows.hash(&mut hasher);
        hasher.finish()
    }
}

/// Give blank headers a positional name and suffix duplicates with `.1`,
/// `.2`, ... so every column can be addressed by name.
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{base}.{count}");
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["age".into(), "job".into()],
            vec![
                vec![CellValue::Integer(30), "admin".into()],
                vec![CellValue::Float(41.5), CellValue::Missing],
                vec![CellValue::Missing, "services".into()],
                vec!["n/a-ish".into(), "admin".into()],
            ],
        )
    }

    #[test]
    fn ordering_puts_missing_first_and_numbers_by_value() {
        let mut values = vec![
            CellValue::Text("b".into()),
            CellValue::Float(1.5),
            CellValue::Missing,
            CellValue::Integer(2),
            CellValue::Text("a".into()),
            CellValue::Integer(1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Missing,
                CellValue::Integer(1),
                CellValue::Float(1.5),
                CellValue::Integer(2),
                CellValue::Text("a".into()),
                CellValue::Text("b".into()),
            ]
        );
    }

    #[test]
    fn integral_floats_equal_their_integer() {
        let hash = |v: &CellValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(CellValue::Integer(1), CellValue::Float(1.0));
        assert_eq!(hash(&CellValue::Integer(1)), hash(&CellValue::Float(1.0)));
        assert_eq!(CellValue::Float(-0.0), CellValue::Float(0.0));
        assert_eq!(hash(&CellValue::Float(-0.0)), hash(&CellValue::Integer(0)));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.5));
        assert_ne!(CellValue::Integer(1), CellValue::from("1"));

        let set = BTreeSet::from([CellValue::Integer(1), CellValue::Float(1.0)]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn as_number_coerces_numeric_text_only() {
        assert_eq!(CellValue::Integer(3).as_number(), Some(3.0));
        assert_eq!(CellValue::Text(" 4.5".into()).as_number(), Some(4.5));
        assert_eq!(CellValue::Text("abc".into()).as_number(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_number(), None);
        assert_eq!(CellValue::Missing.as_number(), None);
    }

    #[test]
    fn short_rows_are_padded() {
        let t = Table::new(vec!["a".into(), "b".into()], vec![vec![1i64.into()]]);
        assert_eq!(t.value(0, "b"), Some(&CellValue::Missing));
    }

    #[test]
    fn distinct_values_skip_missing() {
        let t = sample();
        let jobs: Vec<_> = t.distinct_values("job").unwrap().into_iter().collect();
        assert_eq!(jobs, vec![CellValue::from("admin"), CellValue::from("services")]);
    }

    #[test]
    fn numeric_bounds_ignore_non_numeric() {
        assert_eq!(sample().numeric_bounds("age").unwrap(), Some((30.0, 41.5)));
        assert!(matches!(
            sample().numeric_bounds("salary"),
            Err(AnalysisError::UnknownColumn(_))
        ));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let t = sample();
        assert_eq!(t.fingerprint(), t.clone().fingerprint());
        assert_ne!(t.fingerprint(), t.head(2).fingerprint());
    }

    #[test]
    fn headers_are_normalized() {
        let names = normalize_headers(vec!["a".into(), "".into(), "a".into(), "a".into()]);
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }
}
