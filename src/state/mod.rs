//! State module for tracking crawl progress
//!
//! This module provides the in-memory control and result state of a crawl.
//!
//! # Components
//!
//! - `NodeState`: Enrichment state of one discovered node (pending, resolved, failed)
//! - `Frontier` / `VisitedTracker`: Breadth-first expansion order and expanded-set
//! - `CollectionStore`: Node id to state mapping, capped at the target size

mod collection;
mod frontier;
mod node_state;

// Re-export main types
pub use collection::{CollectionStore, Resolution, StoreError};
pub use frontier::{Frontier, VisitedTracker};
pub use node_state::{NodeId, NodeRecord, NodeState};
