//! Collection store: the source of truth for discovered and enriched nodes
//!
//! Each node id is inserted once as `Pending` and later transitions exactly
//! once to `Resolved` or `Failed`. The store never holds more resolved
//! records than its capacity.

use crate::state::{NodeId, NodeRecord, NodeState};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by illegal collection transitions
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Node {0} was never discovered")]
    UnknownNode(NodeId),

    #[error("Node {id} is already {state}")]
    AlreadyTerminal { id: NodeId, state: &'static str },
}

/// Outcome of resolving a pending node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The record was stored
    Stored,
    /// The collection was already full; the node was marked failed instead
    Truncated,
}

/// Mapping from node id to its enrichment state
#[derive(Debug, Clone)]
pub struct CollectionStore {
    entries: HashMap<NodeId, NodeState>,
    /// Discovery order, used to emit records deterministically
    order: Vec<NodeId>,
    capacity: usize,
    pending: usize,
    resolved: usize,
    failed: usize,
}

impl CollectionStore {
    /// Creates an empty store holding at most `capacity` resolved records
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            capacity,
            pending: 0,
            resolved: 0,
            failed: 0,
        }
    }

    /// Registers a newly discovered node as pending
    ///
    /// Returns `false` if the id was already present (first discovery wins).
    pub fn insert_pending(&mut self, id: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }

        self.entries.insert(id.to_string(), NodeState::Pending);
        self.order.push(id.to_string());
        self.pending += 1;
        true
    }

    /// Transitions a pending node to `Resolved`
    ///
    /// When the store is already at capacity the node is marked `Failed`
    /// and [`Resolution::Truncated`] is returned.
    pub fn resolve(&mut self, id: &str, record: NodeRecord) -> Result<Resolution, StoreError> {
        let at_capacity = self.is_full();
        let state = self.pending_entry(id)?;

        if at_capacity {
            *state = NodeState::Failed;
            self.pending -= 1;
            self.failed += 1;
            return Ok(Resolution::Truncated);
        }

        *state = NodeState::Resolved(record);
        self.pending -= 1;
        self.resolved += 1;
        Ok(Resolution::Stored)
    }

    /// Transitions a pending node to `Failed`
    pub fn fail(&mut self, id: &str) -> Result<(), StoreError> {
        let state = self.pending_entry(id)?;
        *state = NodeState::Failed;
        self.pending -= 1;
        self.failed += 1;
        Ok(())
    }

    fn pending_entry(&mut self, id: &str) -> Result<&mut NodeState, StoreError> {
        let state = self
            .entries
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownNode(id.to_string()))?;

        if state.is_terminal() {
            return Err(StoreError::AlreadyTerminal {
                id: id.to_string(),
                state: state.label(),
            });
        }

        Ok(state)
    }

    /// Returns the state of a node, if it was discovered
    pub fn get(&self, id: &str) -> Option<&NodeState> {
        self.entries.get(id)
    }

    /// Returns whether the node was ever discovered
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns whether the resolved count reached capacity
    pub fn is_full(&self) -> bool {
        self.resolved >= self.capacity
    }

    /// Maximum number of resolved records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of discovered nodes, whatever their state
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing was discovered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Iterates over resolved records in discovery order
    pub fn records(&self) -> impl Iterator<Item = (&NodeId, &NodeRecord)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).and_then(|s| s.record()).map(|r| (id, r)))
    }

    /// Consumes the store, returning resolved records in discovery order
    pub fn into_records(mut self) -> Vec<NodeRecord> {
        self.order
            .iter()
            .filter_map(|id| match self.entries.remove(id) {
                Some(NodeState::Resolved(record)) => Some(record),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> NodeRecord {
        let mut record = NodeRecord::new();
        record.insert("name".to_string(), json!(name));
        record
    }

    #[test]
    fn test_insert_pending_once() {
        let mut store = CollectionStore::new(10);

        assert!(store.insert_pending("1"));
        assert!(!store.insert_pending("1"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.pending_count(), 1);
        assert_eq!(store.get("1"), Some(&NodeState::Pending));
    }

    #[test]
    fn test_resolve_and_fail() {
        let mut store = CollectionStore::new(10);
        store.insert_pending("1");
        store.insert_pending("2");

        assert_eq!(store.resolve("1", record("one")), Ok(Resolution::Stored));
        assert_eq!(store.fail("2"), Ok(()));

        assert_eq!(store.resolved_count(), 1);
        assert_eq!(store.failed_count(), 1);
        assert_eq!(store.pending_count(), 0);
        assert!(store.get("1").unwrap().is_resolved());
        assert!(store.get("2").unwrap().is_failed());
    }

    #[test]
    fn test_terminal_states_never_revert() {
        let mut store = CollectionStore::new(10);
        store.insert_pending("1");
        store.resolve("1", record("one")).unwrap();

        assert!(matches!(
            store.fail("1"),
            Err(StoreError::AlreadyTerminal { .. })
        ));
        assert!(matches!(
            store.resolve("1", record("again")),
            Err(StoreError::AlreadyTerminal { .. })
        ));
        assert_eq!(store.get("1").unwrap().record().unwrap()["name"], json!("one"));
    }

    #[test]
    fn test_unknown_node() {
        let mut store = CollectionStore::new(10);
        assert_eq!(
            store.fail("missing"),
            Err(StoreError::UnknownNode("missing".to_string()))
        );
    }

    #[test]
    fn test_capacity_truncates() {
        let mut store = CollectionStore::new(1);
        store.insert_pending("1");
        store.insert_pending("2");

        assert_eq!(store.resolve("1", record("one")), Ok(Resolution::Stored));
        assert!(store.is_full());
        assert_eq!(store.resolve("2", record("two")), Ok(Resolution::Truncated));

        assert_eq!(store.resolved_count(), 1);
        assert!(store.get("2").unwrap().is_failed());
    }

    #[test]
    fn test_records_in_discovery_order() {
        let mut store = CollectionStore::new(10);
        for id in ["c", "a", "b"] {
            store.insert_pending(id);
        }
        store.resolve("b", record("b")).unwrap();
        store.resolve("c", record("c")).unwrap();
        store.fail("a").unwrap();

        let ids: Vec<_> = store.records().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);

        let names: Vec<_> = store
            .into_records()
            .into_iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["c", "b"]);
    }
}
