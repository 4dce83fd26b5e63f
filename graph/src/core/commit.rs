use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque commit identity (usually a hex SHA)
pub type CommitId = String;

/// A commit as supplied by the commit source, in log order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Unique commit ID
    pub id: CommitId,
    /// Parent commit IDs, first parent first
    #[serde(default)]
    pub parents: Vec<CommitId>,
    /// Display data, ignored by the graph engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CommitDetails>,
}

/// Human facing commit data carried alongside the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub author: String,
    /// Commit message (short)
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    pub fn new(id: impl Into<CommitId>, parents: Vec<CommitId>) -> Self {
        Self {
            id: id.into(),
            parents,
            details: None,
        }
    }

    /// A commit without parents
    pub fn root(id: impl Into<CommitId>) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn with_details(mut self, details: CommitDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
