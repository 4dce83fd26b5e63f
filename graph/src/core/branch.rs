use super::commit::CommitId;
use serde::Serialize;
use std::fmt;

/// Handle of a branch label stored in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BranchId(pub(crate) u32);

impl BranchId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Label of a run of nodes and edges, used for coloring only.
///
/// A branch is named by the commit that starts it and the commit it
/// descends toward. A branch that starts at a commit nobody referenced
/// is named by that commit alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Branch {
    start: CommitId,
    toward: CommitId,
}

impl Branch {
    pub fn new(start: CommitId, toward: CommitId) -> Self {
        Self { start, toward }
    }

    /// Fresh branch labeled by a single commit
    pub fn from_commit(id: &str) -> Self {
        Self::new(id.to_string(), id.to_string())
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn toward(&self) -> &str {
        &self.toward
    }

    /// Stable palette slot for this label
    pub fn color_index(&self, modulo: usize) -> usize {
        if modulo == 0 {
            return 0;
        }
        // FNV-1a
        let mut hash: u64 = 1469598103934665603;
        for b in self.start.bytes().chain([0u8]).chain(self.toward.bytes()) {
            hash ^= b as u64;
            hash = hash.wrapping_mul(1099511628211);
        }
        (hash % modulo as u64) as usize
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.toward {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}->{}", self.start, self.toward)
        }
    }
}
