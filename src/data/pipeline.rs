use std::sync::Arc;

use log::{debug, info};

use super::cache::AnalysisCache;
use super::export::{ExportFormat, ExportPayload};
use super::filter::FilterSpec;
use super::model::Table;
use super::summary::{summarize_with_fallback, TargetProportions};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};

/// Fail with `MissingColumns` (in `required` order) unless every required
/// column is present.
pub fn validate_columns(table: &Table, required: &[String]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !table.has_column(c))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::MissingColumns(missing))
    }
}

/// Output of one filter submission.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub spec: FilterSpec,
    pub filtered: Arc<Table>,
    pub proportions: TargetProportions,
}

/// Which proportion table a download refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Raw,
    Filtered,
}

/// A download ready to be written, with its suggested file name.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub payload: Arc<ExportPayload>,
}

// ---------------------------------------------------------------------------
// Session – one loaded upload and everything derived from it
// ---------------------------------------------------------------------------

/// One user's loaded dataset. Each session owns its table, cache and last
/// analysis; nothing is shared between sessions. The cache is handed back
/// with [`Session::into_cache`] so the next upload can reuse it.
#[derive(Debug)]
pub struct Session {
    config: AnalysisConfig,
    raw: Arc<Table>,
    cache: AnalysisCache,
    analysis: Analysis,
}

impl Session {
    /// Load and validate an upload, then run the identity filter.
    ///
    /// On success the session takes over `cache`, leaving an empty one
    /// behind; on error the caller keeps it as it was.
    pub fn open(bytes: &[u8], config: AnalysisConfig, cache: &mut AnalysisCache) -> Result<Self> {
        let raw = cache.load(bytes, config.input_delimiter)?;
        validate_columns(&raw, &config.required_columns)?;
        info!("Session opened with {} rows", raw.len());

        let spec = FilterSpec::identity(&raw, &config)?;
        let analysis = run(cache, &raw, spec, &config)?;
        Ok(Session {
            config,
            raw,
            cache: std::mem::take(cache),
            analysis,
        })
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AnalysisCache {
        &mut self.cache
    }

    pub fn into_cache(self) -> AnalysisCache {
        self.cache
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn raw(&self) -> &Table {
        &self.raw
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// The identity filter of the loaded table.
    pub fn default_spec(&self) -> Result<FilterSpec> {
        FilterSpec::identity(&self.raw, &self.config)
    }

    /// Apply a submitted filter and recompute both proportion summaries.
    pub fn analyze(&mut self, spec: FilterSpec) -> Result<&Analysis> {
        self.analysis = run(&mut self.cache, &self.raw, spec, &self.config)?;
        Ok(&self.analysis)
    }

    /// Serialize the raw or filtered proportion table.
    pub fn download(&mut self, kind: SummaryKind, format: ExportFormat) -> Result<Download> {
        let (summary, name) = match kind {
            SummaryKind::Raw => (&self.analysis.proportions.raw, &self.config.raw_download_name),
            SummaryKind::Filtered => (
                &self.analysis.proportions.filtered,
                &self.config.filtered_download_name,
            ),
        };
        let file_name = match name.rsplit_once('.') {
            Some((stem, _)) => format!("{stem}.{}", format.extension()),
            None => format!("{name}.{}", format.extension()),
        };
        let payload = self.cache.export(&summary.to_table(), format)?;
        debug!("download {file_name}: {} bytes", payload.bytes.len());
        Ok(Download { file_name, payload })
    }
}

fn run(
    cache: &mut AnalysisCache,
    raw: &Table,
    spec: FilterSpec,
    config: &AnalysisConfig,
) -> Result<Analysis> {
    let filtered = cache.filter(raw, &spec)?;
    let proportions = summarize_with_fallback(raw, &filtered, &config.target_column)?;
    Ok(Analysis {
        spec,
        filtered,
        proportions,
    })
}
