//! Telemarketing campaign analysis.
//!
//! Load a bank marketing table (semicolon-separated text or a workbook),
//! filter it by age and by a set of categorical columns, and compare the
//! acceptance rate (`y`) of the filtered rows with the full table.
//!
//! ```no_run
//! use telemarketing_analysis::prelude::*;
//!
//! let bytes = std::fs::read("bank-additional.csv").unwrap();
//! let mut cache = AnalysisCache::default();
//! let mut session = Session::open(&bytes, AnalysisConfig::default(), &mut cache).unwrap();
//! let spec = session
//!     .default_spec()
//!     .unwrap()
//!     .with_range(30.0, 40.0)
//!     .with_selection("job", Selection::Only([CellValue::from("admin.")].into()));
//! let analysis = session.analyze(spec).unwrap();
//! println!("{:?}", analysis.proportions.filtered.display_rows());
//! ```

pub mod config;
pub mod data;
pub mod error;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::data::cache::{AnalysisCache, Memo};
    pub use crate::data::export::{
        export, to_csv_bytes, to_xlsx_bytes, ExportFormat, ExportPayload,
    };
    pub use crate::data::filter::{
        apply_range, apply_selection, filter_options, FilterSpec, RangeFilter, Selection,
    };
    pub use crate::data::loader::{load, load_bytes, load_path, parse_delimited};
    pub use crate::data::model::{CellValue, Table};
    pub use crate::data::pipeline::{validate_columns, Analysis, Download, Session, SummaryKind};
    pub use crate::data::summary::{
        summarize, summarize_with_fallback, ProportionSummary, TargetProportions,
    };
    pub use crate::error::{AnalysisError, Result};
}
