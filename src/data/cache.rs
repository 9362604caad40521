use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::Cursor;
use std::sync::Arc;

use log::trace;

use super::export::{ExportFormat, ExportPayload};
use super::filter::FilterSpec;
use super::loader;
use super::model::Table;
use crate::error::Result;

/// Hash any argument tuple into a cache key.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Memo – one pure function's results keyed on its argument fingerprint
// ---------------------------------------------------------------------------

/// Entries kept per memo by [`AnalysisCache::default`].
pub const DEFAULT_CAPACITY: usize = 32;

/// Results of one pure function, keyed on argument fingerprints.
///
/// Holds at most `capacity` entries; inserting past that evicts the oldest
/// one. Entries never expire by time.
#[derive(Debug)]
pub struct Memo<V> {
    entries: HashMap<u64, Arc<V>>,
    order: VecDeque<u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V> Memo<V> {
    /// A memo holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `key`, or compute and store it.
    /// Errors are returned as-is and never cached.
    pub fn get_or_try_insert<F>(&mut self, key: u64, compute: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(v) = self.entries.get(&key) {
            self.hits += 1;
            trace!("memo hit {key:016x}");
            return Ok(Arc::clone(v));
        }
        self.misses += 1;
        let value = Arc::new(compute()?);
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                trace!("memo evict {oldest:016x}");
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, Arc::clone(&value));
        self.order.push_back(key);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

// ---------------------------------------------------------------------------
// AnalysisCache – memos for the pure pipeline stages
// ---------------------------------------------------------------------------

/// Memoized loads, filters and exports. Owned by the caller and handed to
/// each [`Session`](super::pipeline::Session) it opens, so reopening an
/// upload can hit.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    pub loads: Memo<Table>,
    pub filters: Memo<Table>,
    pub exports: Memo<ExportPayload>,
}

impl AnalysisCache {
    /// Every memo bounded to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            loads: Memo::with_capacity(capacity),
            filters: Memo::with_capacity(capacity),
            exports: Memo::with_capacity(capacity),
        }
    }

    pub fn load(&mut self, bytes: &[u8], delimiter: u8) -> Result<Arc<Table>> {
        let key = fingerprint(&(bytes, delimiter));
        self.loads.get_or_try_insert(key, || {
            loader::load_with_delimiter(&mut Cursor::new(bytes), delimiter)
        })
    }

    pub fn filter(&mut self, table: &Table, spec: &FilterSpec) -> Result<Arc<Table>> {
        let key = fingerprint(&(table.fingerprint(), spec));
        self.filters.get_or_try_insert(key, || spec.apply(table))
    }

    pub fn export(&mut self, table: &Table, format: ExportFormat) -> Result<Arc<ExportPayload>> {
        let key = fingerprint(&(table.fingerprint(), format));
        self.exports
            .get_or_try_insert(key, || super::export::export(table, format))
    }

    pub fn clear(&mut self) {
        self.loads.clear();
        self.filters.clear();
        self.exports.clear();
    }
}
