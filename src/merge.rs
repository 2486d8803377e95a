//! Merge several project lists into one, keyed by project name.
//!
//! When a name shows up more than once the entry with the strictly higher
//! `stars_count` wins; ties keep whichever was seen first. Output keeps the
//! order in which names were first seen.

use crate::dataset::load_array;
use crate::error::{Result, StarsError};
use crate::models::{ProjectFields, Record};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, warn};

/// What `ProjectMerger::merge_record` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Inserted,
    Replaced,
    KeptExisting,
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub files_read: usize,
    pub files_skipped: usize,
    pub records_seen: usize,
    pub records_skipped: usize,
    pub replaced: usize,
    pub kept_existing: usize,
}

#[derive(Debug, Default)]
pub struct ProjectMerger {
    projects: Vec<Record>,
    // name key -> position in `projects`
    index: HashMap<String, usize>,
    stats: MergeStats,
}

impl ProjectMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every entry of one file. File-level problems (unreadable, not
    /// JSON, not an array) are returned and leave the merger unchanged.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let entries = match load_array(path) {
            Ok(entries) => entries,
            Err(e) => {
                self.stats.files_skipped += 1;
                return Err(e);
            }
        };

        self.stats.files_read += 1;
        let source = path.display().to_string();
        debug!("Merging {} entries from {}", entries.len(), source);
        for entry in entries {
            self.merge_entry(&source, entry);
        }
        Ok(())
    }

    /// Validate one raw entry and merge it.
    pub fn merge_entry(&mut self, source: &str, entry: Value) -> MergeAction {
        self.stats.records_seen += 1;

        let record = match entry {
            Value::Object(record)
                if record.name().is_some() && record.stars_count().is_some() =>
            {
                record
            }
            _ => {
                warn!("Skipping invalid project entry in {}", source);
                self.stats.records_skipped += 1;
                return MergeAction::Skipped;
            }
        };

        if !record.stars_count().map_or(false, Value::is_number) {
            warn!(
                "Skipping project entry with non-numeric stars_count in {}",
                source
            );
            self.stats.records_skipped += 1;
            return MergeAction::Skipped;
        }

        let action = self.merge_record(record);
        match action {
            MergeAction::Replaced => self.stats.replaced += 1,
            MergeAction::KeptExisting => self.stats.kept_existing += 1,
            _ => {}
        }
        action
    }

    /// Merge a record already known to carry a name and a numeric star count.
    fn merge_record(&mut self, record: Record) -> MergeAction {
        let key = match record.name() {
            Some(name) => name_key(name),
            None => return MergeAction::Skipped,
        };

        match self.index.get(&key) {
            Some(&position) => {
                let existing = &mut self.projects[position];
                if compare_stars(&record, existing) == Some(Ordering::Greater) {
                    *existing = record;
                    MergeAction::Replaced
                } else {
                    MergeAction::KeptExisting
                }
            }
            None => {
                self.index.insert(key, self.projects.len());
                self.projects.push(record);
                MergeAction::Inserted
            }
        }
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn into_projects(self) -> Vec<Record> {
        self.projects
    }
}

/// Merge the given files in order. Files that cannot be used are logged and
/// skipped.
pub fn merge_projects<P: AsRef<Path>>(input_files: &[P]) -> (Vec<Record>, MergeStats) {
    let mut merger = ProjectMerger::new();

    for path in input_files {
        let path = path.as_ref();
        if let Err(e) = merger.merge_file(path) {
            match e {
                StarsError::IoError(_) => {
                    error!("Could not open file {}: {}", path.display(), e)
                }
                StarsError::JsonError(_) => {
                    error!("{} is not a valid JSON file: {}", path.display(), e)
                }
                other => error!("{}", other),
            }
        }
    }

    let stats = merger.stats().clone();
    (merger.into_projects(), stats)
}

// Serialized JSON keeps names of different types apart ("1" vs 1).
fn name_key(name: &Value) -> String {
    name.to_string()
}

fn compare_stars(candidate: &Record, existing: &Record) -> Option<Ordering> {
    let (a, b) = (candidate.stars_count()?, existing.stars_count()?);
    match (as_integer(a), as_integer(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        // Floats, or integers outside the 64-bit range
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn as_integer(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}
