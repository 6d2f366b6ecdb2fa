//! JSON corpus files
//!
//! The crawl result is a single JSON array of records. Besides writing a
//! fresh array, records can be merged into an existing corpus keyed by game id.

use crate::state::NodeRecord;
use crate::CrawlError;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Counts produced by [`merge_into_corpus`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Existing records updated with fresh fields
    pub updated: usize,
    /// Records appended to the corpus
    pub added: usize,
    /// Existing records folded into an earlier record with the same id
    pub collapsed: usize,
    /// Size of the corpus after merging
    pub total: usize,
}

/// Writes records as a pretty-printed JSON array
///
/// Parent directories are created when missing.
pub fn write_records(path: &Path, records: &[NodeRecord]) -> Result<(), CrawlError> {
    let output_error = |source| CrawlError::Output {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(output_error)?;
    }

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| {
        if e.is_io() {
            output_error(std::io::Error::from(e))
        } else {
            CrawlError::Json(e)
        }
    })?;
    writer.flush().map_err(output_error)?;

    Ok(())
}

/// Reads a JSON array of records
///
/// A missing file reads as an empty corpus.
pub fn read_records(path: &Path) -> Result<Vec<NodeRecord>, CrawlError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let value: Value = serde_json::from_str(&content)?;
    let invalid = || CrawlError::InvalidCorpus {
        path: path.display().to_string(),
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// Key a record is merged on: `id`, falling back to `universeId`
fn record_key(record: &NodeRecord) -> Option<String> {
    ["id", "universeId"]
        .iter()
        .filter_map(|field| record.get(*field))
        .find_map(|value| match value {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Folds records sharing a key into their first occurrence
///
/// Later duplicates overwrite the fields they carry. Returns the collapsed
/// corpus, its key index, and the number of records dropped.
fn collapse_duplicates(
    records: Vec<NodeRecord>,
) -> (Vec<NodeRecord>, HashMap<String, usize>, usize) {
    let mut corpus: Vec<NodeRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collapsed = 0;

    for record in records {
        let Some(key) = record_key(&record) else {
            corpus.push(record);
            continue;
        };

        match index.get(&key) {
            Some(&i) => {
                corpus[i].extend(record);
                collapsed += 1;
            }
            None => {
                index.insert(key, corpus.len());
                corpus.push(record);
            }
        }
    }

    (corpus, index, collapsed)
}

/// Merges fresh records into the corpus at `path`
///
/// Existing records sharing an id are collapsed first. Records whose key
/// already exists have their fields overwritten by the fresh values; others
/// are appended. Fresh records without a key are skipped. The merged corpus
/// is written back to `path`.
pub fn merge_into_corpus(path: &Path, fresh: &[NodeRecord]) -> Result<MergeSummary, CrawlError> {
    let existing = read_records(path)?;
    tracing::info!("Loaded {} existing games from {}", existing.len(), path.display());

    let (mut corpus, mut index, collapsed) = collapse_duplicates(existing);
    if collapsed > 0 {
        tracing::warn!("Collapsed {} duplicate games in {}", collapsed, path.display());
    }

    let mut summary = MergeSummary {
        collapsed,
        ..Default::default()
    };

    for record in fresh {
        let Some(key) = record_key(record) else {
            tracing::debug!("Skipping record without an id during merge");
            continue;
        };

        match index.get(&key) {
            Some(&i) => {
                for (field, value) in record {
                    corpus[i].insert(field.clone(), value.clone());
                }
                summary.updated += 1;
            }
            None => {
                index.insert(key, corpus.len());
                corpus.push(record.clone());
                summary.added += 1;
            }
        }
    }

    summary.total = corpus.len();
    write_records(path, &corpus)?;

    Ok(summary)
}
