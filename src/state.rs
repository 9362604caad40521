use std::collections::BTreeSet;

use telemarketing_analysis::prelude::*;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Filter form state
// ---------------------------------------------------------------------------

/// Chart style for the raw vs. filtered comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bars,
    Pie,
}

/// One multi-select in the filter form: the "all" pick plus explicit values.
#[derive(Debug, Clone)]
pub struct ColumnPicks {
    pub column: String,
    /// Sorted distinct non-missing values observed at load time.
    pub options: Vec<CellValue>,
    pub all: bool,
    pub picked: BTreeSet<CellValue>,
}

impl ColumnPicks {
    pub fn selection(&self) -> Selection {
        Selection::from_picks(self.all, self.picked.iter().cloned())
    }
}

/// Widget values of the filter form. Edits stay here until Apply.
#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    pub chart_kind: ChartKind,
    pub age_bounds: (f64, f64),
    pub age_range: (f64, f64),
    pub columns: Vec<ColumnPicks>,
}

impl FilterForm {
    fn for_table(table: &Table, spec: &FilterSpec) -> Result<Self> {
        let columns = spec
            .selections
            .iter()
            .map(|(column, _)| {
                Ok(ColumnPicks {
                    column: column.clone(),
                    options: filter_options(table, column)?,
                    all: true,
                    picked: BTreeSet::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let bounds = (spec.range.min, spec.range.max);
        Ok(FilterForm {
            chart_kind: ChartKind::default(),
            age_bounds: bounds,
            age_range: bounds,
            columns,
        })
    }

    /// Build the submitted [`FilterSpec`] on top of the session default.
    fn to_spec(&self, base: FilterSpec) -> FilterSpec {
        let (lo, hi) = self.age_range;
        self.columns
            .iter()
            .fold(base.with_range(lo.min(hi), hi.max(lo)), |spec, picks| {
                spec.with_selection(&picks.column, picks.selection())
            })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded upload (None until user opens a file).
    pub session: Option<Session>,

    /// Filter form being edited in the side panel.
    pub form: FilterForm,

    /// Chart style of the last submitted form.
    pub chart_kind: ChartKind,

    /// Colours of the target values, shared by both charts.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Open an upload, reusing the current session's cache. A failed open
    /// leaves the current session and its cache in place.
    pub fn open_upload(&mut self, bytes: &[u8]) -> Result<()> {
        let mut cache = self
            .session
            .as_mut()
            .map(|s| std::mem::take(s.cache_mut()))
            .unwrap_or_default();
        match Session::open(bytes, AnalysisConfig::default(), &mut cache) {
            Ok(session) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    session.raw().len(),
                    session.raw().columns()
                );
                self.set_session(session);
                Ok(())
            }
            Err(e) => {
                if let Some(current) = self.session.as_mut() {
                    *current.cache_mut() = cache;
                }
                Err(e)
            }
        }
    }

    /// Take over a newly opened session and reset the form.
    pub fn set_session(&mut self, session: Session) {
        match session
            .default_spec()
            .and_then(|spec| FilterForm::for_table(session.raw(), &spec))
        {
            Ok(form) => self.form = form,
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        }
        let target = &session.config().target_column;
        self.color_map = session
            .raw()
            .distinct_values(target)
            .ok()
            .map(|vals| ColorMap::new(&vals));
        self.chart_kind = self.form.chart_kind;
        self.session = Some(session);
        self.status_message = None;
    }

    /// Submit the filter form.
    pub fn apply_filters(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let result = session
            .default_spec()
            .and_then(|base| session.analyze(self.form.to_spec(base)).map(|_| ()));
        match result {
            Ok(()) => {
                self.chart_kind = self.form.chart_kind;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to apply filters: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPLOAD: &str = "age;job;marital;default;housing;loan;contact;month;day_of_week;y\n\
                          30;admin;married;no;yes;no;cellular;may;mon;yes\n\
                          45;services;single;no;no;no;telephone;jun;tue;no\n";

    fn session() -> Session {
        Session::open(
            UPLOAD.as_bytes(),
            AnalysisConfig::default(),
            &mut AnalysisCache::default(),
        )
        .unwrap()
    }

    #[test]
    fn form_starts_as_identity() {
        let mut state = AppState::default();
        state.set_session(session());
        assert_eq!(state.form.age_range, (30.0, 45.0));
        assert_eq!(state.form.columns.len(), 8);
        assert!(state.form.columns.iter().all(|c| c.all));
    }

    #[test]
    fn reopening_an_upload_reuses_the_cache() {
        let mut state = AppState::default();
        state.open_upload(UPLOAD.as_bytes()).unwrap();
        state.open_upload(UPLOAD.as_bytes()).unwrap();
        let cache = state.session.as_ref().unwrap().cache();
        assert_eq!(cache.loads.hits(), 1);

        state.open_upload(b"age;job\n30;admin\n").unwrap_err();
        let cache = state.session.as_ref().unwrap().cache();
        assert_eq!(cache.loads.len(), 2);
        assert_eq!(state.session.as_ref().unwrap().raw().len(), 2);
    }

    #[test]
    fn edits_apply_only_on_submit() {
        let mut state = AppState::default();
        state.set_session(session());
        state.form.columns[0].all = false;
        state.form.columns[0].picked.insert(CellValue::from("admin"));
        let before = state.session.as_ref().unwrap().analysis().filtered.len();
        assert_eq!(before, 2);

        state.apply_filters();
        let after = state.session.as_ref().unwrap().analysis().filtered.len();
        assert_eq!(after, 1);
    }
}
