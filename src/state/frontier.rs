//! Frontier queue and visited-set for breadth-first expansion
//!
//! The frontier holds node ids whose recommendations have not been requested
//! yet, in discovery order. The visited tracker records ids that have already
//! been expanded so they are never expanded twice.

use crate::state::NodeId;
use std::collections::{HashSet, VecDeque};

/// Grow-only set of node ids whose recommendations have been requested
#[derive(Debug, Default, Clone)]
pub struct VisitedTracker {
    visited: HashSet<NodeId>,
}

impl VisitedTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a node as expanded
    ///
    /// Returns `true` if the node was not visited before.
    pub fn mark_visited(&mut self, id: &str) -> bool {
        self.visited.insert(id.to_string())
    }

    /// Returns whether the node has already been expanded
    pub fn contains(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Number of expanded nodes
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    /// Returns whether no node has been expanded yet
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// FIFO queue of node ids awaiting expansion
///
/// An id is present at most once at any time. Ids already in the
/// [`VisitedTracker`] are never admitted.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    queue: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an id to the back of the frontier
    ///
    /// This is a no-op if the id was already expanded or is already waiting
    /// in the queue.
    ///
    /// # Returns
    ///
    /// * `true` - The id was appended
    /// * `false` - The id was ignored
    pub fn enqueue(&mut self, id: &str, visited: &VisitedTracker) -> bool {
        if visited.contains(id) || self.queued.contains(id) {
            return false;
        }

        self.queued.insert(id.to_string());
        self.queue.push_back(id.to_string());
        true
    }

    /// Removes and returns the id at the front, or `None` when empty
    pub fn dequeue(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        self.queued.remove(&id);
        Some(id)
    }

    /// Returns whether an id is currently waiting in the queue
    pub fn contains(&self, id: &str) -> bool {
        self.queued.contains(id)
    }

    /// Number of ids waiting for expansion
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is exhausted
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
