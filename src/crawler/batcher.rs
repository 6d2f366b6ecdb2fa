//! Enrichment batching
//!
//! Discovered ids are accumulated until a full batch is available, then
//! enriched with one detail call and one thumbnail call. Results are written
//! to the collection only once both calls have finished, so an interrupted
//! flush leaves its ids pending.

use crate::crawler::dispatch::{Dispatch, Dispatcher};
use crate::state::{CollectionStore, NodeId, NodeRecord, Resolution};
use serde_json::Value;

/// Field injected into every record with the node id
pub const UNIVERSE_ID_FIELD: &str = "universeId";

/// Field injected into records that received a thumbnail
pub const IMAGE_URL_FIELD: &str = "imageUrl";

/// What a single flush did to the collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Ids submitted in the batch
    pub requested: usize,
    /// Records stored
    pub stored: usize,
    /// Ids the service did not return
    pub failed: usize,
    /// Records dropped because the collection was already full
    pub truncated: usize,
    /// Stored records that carry an image URL
    pub with_image: usize,
}

impl FlushSummary {
    fn absorb(&mut self, other: FlushSummary) {
        self.requested += other.requested;
        self.stored += other.stored;
        self.failed += other.failed;
        self.truncated += other.truncated;
        self.with_image += other.with_image;
    }
}

/// Outcome of a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Completed(FlushSummary),
    /// Cancellation interrupted the flush; its ids stay pending
    Cancelled(FlushSummary),
}

/// Accumulates discovered ids into detail-lookup batches
#[derive(Debug, Clone)]
pub struct EnrichmentBatcher {
    batch_size: usize,
    pending: Vec<NodeId>,
}

impl EnrichmentBatcher {
    /// Creates a batcher flushing every `batch_size` ids (at least one)
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            pending: Vec::with_capacity(batch_size),
        }
    }

    /// Appends an id to the pending batch
    ///
    /// Returns `true` once the batch has reached its threshold and must be flushed.
    pub fn add(&mut self, id: &str) -> bool {
        self.pending.push(id.to_string());
        self.is_full()
    }

    /// Returns whether a full batch is waiting
    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.batch_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of ids waiting for enrichment
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes up to one batch of ids, oldest first
    fn take_batch(&mut self) -> Vec<NodeId> {
        let end = self.pending.len().min(self.batch_size);
        self.pending.drain(..end).collect()
    }

    /// Enriches the oldest batch of pending ids
    ///
    /// Details are fetched first. Thumbnails are then requested only for the
    /// ids that returned details, not for the whole batch, since ids without
    /// details fail whatever their thumbnail. Returned ids resolve in batch
    /// order; missing ids fail.
    pub async fn flush(
        &mut self,
        dispatcher: &mut Dispatcher,
        store: &mut CollectionStore,
    ) -> FlushOutcome {
        let batch = self.take_batch();
        if batch.is_empty() {
            return FlushOutcome::Completed(FlushSummary::default());
        }

        if store.is_full() {
            return FlushOutcome::Completed(truncate_batch(&batch, store));
        }

        tracing::debug!("Fetching details for {} games", batch.len());
        let mut details = match dispatcher.details(&batch).await {
            Dispatch::Completed(details) => details,
            Dispatch::Cancelled => return FlushOutcome::Cancelled(FlushSummary::default()),
        };

        let found: Vec<NodeId> = batch
            .iter()
            .filter(|id| details.contains_key(*id))
            .cloned()
            .collect();

        let thumbnails = if found.is_empty() {
            Default::default()
        } else {
            tracing::debug!("Fetching thumbnails for {} games", found.len());
            match dispatcher.thumbnails(&found).await {
                Dispatch::Completed(thumbnails) => thumbnails,
                Dispatch::Cancelled => return FlushOutcome::Cancelled(FlushSummary::default()),
            }
        };

        let mut summary = FlushSummary {
            requested: batch.len(),
            ..Default::default()
        };

        for id in &batch {
            match details.remove(id) {
                Some(mut record) => {
                    let has_image = merge_enrichment(&mut record, id, thumbnails.get(id));
                    let name = record_name(&record);

                    match store.resolve(id, record) {
                        Ok(Resolution::Stored) => {
                            summary.stored += 1;
                            if has_image {
                                summary.with_image += 1;
                            }
                            tracing::debug!("Added game {} ({})", id, name);
                        }
                        Ok(Resolution::Truncated) => summary.truncated += 1,
                        Err(e) => tracing::warn!("Dropping details for {}: {}", id, e),
                    }
                }
                None => match store.fail(id) {
                    Ok(()) => summary.failed += 1,
                    Err(e) => tracing::warn!("Cannot mark {} as failed: {}", id, e),
                },
            }
        }

        FlushOutcome::Completed(summary)
    }

    /// Drains every pending id, one batch at a time
    pub async fn flush_remaining(
        &mut self,
        dispatcher: &mut Dispatcher,
        store: &mut CollectionStore,
    ) -> FlushOutcome {
        let mut total = FlushSummary::default();

        while !self.is_empty() {
            match self.flush(dispatcher, store).await {
                FlushOutcome::Completed(summary) => total.absorb(summary),
                FlushOutcome::Cancelled(_) => return FlushOutcome::Cancelled(total),
            }
        }

        FlushOutcome::Completed(total)
    }
}

/// Fails a whole batch without remote calls once the collection is full
fn truncate_batch(batch: &[NodeId], store: &mut CollectionStore) -> FlushSummary {
    let mut summary = FlushSummary {
        requested: batch.len(),
        ..Default::default()
    };

    for id in batch {
        match store.fail(id) {
            Ok(()) => summary.truncated += 1,
            Err(e) => tracing::warn!("Cannot mark {} as failed: {}", id, e),
        }
    }

    tracing::debug!("Collection full, skipped enrichment of {} games", batch.len());
    summary
}

/// Injects the node id and, when present, the thumbnail URL into a record
///
/// Returns whether an image URL was attached.
fn merge_enrichment(record: &mut NodeRecord, id: &str, image_url: Option<&String>) -> bool {
    record.insert(UNIVERSE_ID_FIELD.to_string(), Value::String(id.to_string()));

    match image_url {
        Some(url) => {
            record.insert(IMAGE_URL_FIELD.to_string(), Value::String(url.clone()));
            true
        }
        None => false,
    }
}

fn record_name(record: &NodeRecord) -> String {
    record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}
