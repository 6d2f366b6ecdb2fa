/// Node state definitions for tracking enrichment progress
///
/// Every discovered node holds exactly one of these states in the collection.
use std::fmt;

/// Opaque identifier of a node (a game's universe id)
pub type NodeId = String;

/// Enriched payload of a node: the detail attributes returned by the remote
/// service plus the injected `universeId` and optional `imageUrl`
pub type NodeRecord = serde_json::Map<String, serde_json::Value>;

/// Represents the enrichment state of a discovered node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    // ===== Active States =====
    /// Node has been discovered and is waiting for its detail lookup
    Pending,

    // ===== Terminal States =====
    /// Node was successfully enriched
    Resolved(NodeRecord),

    /// Detail lookup returned nothing for this node, or the collection was full
    Failed,
}

impl NodeState {
    /// Returns true if this is a terminal state (no further transition allowed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if the node is still waiting for enrichment
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if this node holds an enriched record
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns true if enrichment failed for this node
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns the enriched record, if any
    pub fn record(&self) -> Option<&NodeRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            _ => None,
        }
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved(_) => "resolved",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
