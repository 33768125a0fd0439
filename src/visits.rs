//! Per-client visit counts used as a popularity signal for the carousel.
//!
//! Counts are additive: every recorded view increments, with no
//! de-duplication. The whole map lives in one storage slot as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::traits::{Clock, VisitStorage};

/// Name of the storage slot holding the serialized visit map.
pub const VISITS_SLOT: &str = "cms_visits";

/// Item code to number of recorded visits.
pub type VisitMap = BTreeMap<String, u64>;

// ==================== File Storage ====================

/// Durable storage: the slot is a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/cms-catalog/cms_visits.json`, or the working directory if
    /// the platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cms-catalog")
            .join(format!("{}.json", VISITS_SLOT))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VisitStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read visits from {}", self.path.display()))?;
        Ok(Some(contents))
    }

    fn save(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create visits directory")?;
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write visits to {}", self.path.display()))
    }
}

// ==================== Visit Counter ====================

#[derive(Debug, Serialize)]
struct VisitRecord<'a> {
    code: &'a str,
    visits: u64,
}

/// Visit store with `record`/`all` over an injected storage backend.
///
/// Storage is read once, on first access, and cached afterwards.
#[derive(Debug)]
pub struct VisitCounter<S: VisitStorage> {
    storage: S,
    cache: Option<VisitMap>,
}

impl<S: VisitStorage> VisitCounter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cache: None,
        }
    }

    fn load(&self) -> VisitMap {
        match self.storage.load() {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt visit map: {}", e);
                VisitMap::new()
            }),
            Ok(None) => VisitMap::new(),
            Err(e) => {
                tracing::warn!("Visit storage unavailable, starting empty: {:#}", e);
                VisitMap::new()
            }
        }
    }

    fn map_mut(&mut self) -> &mut VisitMap {
        if self.cache.is_none() {
            self.cache = Some(self.load());
        }
        self.cache.get_or_insert_with(VisitMap::new)
    }

    /// Current visit counts. Never fails; bad storage reads as empty.
    pub fn all(&mut self) -> &VisitMap {
        self.map_mut()
    }

    pub fn count(&mut self, code: &str) -> u64 {
        self.all().get(code).copied().unwrap_or(0)
    }

    /// Increment the count for `code` and persist the whole map.
    ///
    /// Returns the new count. A failed write is logged and the in-memory
    /// count is kept.
    pub fn record(&mut self, code: &str) -> u64 {
        let map = self.map_mut();
        let count = map.entry(code.to_string()).or_insert(0);
        *count += 1;
        let count = *count;

        let persisted = serde_json::to_string(&*map)
            .context("Failed to serialize visit map")
            .and_then(|json| self.storage.save(&json));
        if let Err(e) = persisted {
            tracing::warn!("Failed to persist visit for {}: {:#}", code, e);
        }

        tracing::debug!("Recorded visit for {} (now {})", code, count);
        count
    }

    /// Write all counts to a timestamped CSV file in `output_dir`, most
    /// visited first.
    pub fn export_to_csv<C: Clock>(&mut self, output_dir: &Path, clock: &C) -> Result<PathBuf> {
        let export_time = clock.now_utc();
        let filename = format!(
            "{}_export_{}.csv",
            VISITS_SLOT,
            export_time.format("%Y%m%d_%H%M%S")
        );
        let output_path = output_dir.join(&filename);

        let mut records: Vec<VisitRecord<'_>> = self
            .all()
            .iter()
            .map(|(code, &visits)| VisitRecord { code, visits })
            .collect();
        records.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.code.cmp(b.code)));

        let mut wtr =
            csv::Writer::from_path(&output_path).context("Failed to create CSV writer")?;
        for record in &records {
            wtr.serialize(record)
                .context("Failed to serialize visit record")?;
        }
        wtr.flush().context("Failed to flush CSV writer")?;

        Ok(output_path)
    }
}
