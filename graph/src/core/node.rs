use super::branch::BranchId;
use super::commit::CommitId;
use super::edge::EdgeId;
use super::row::RowIdx;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Stable handle of a node in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a grid cell stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// A commit placed at its own log row
    Commit(CommitId),
    /// Pass-through cell keeping a branch line continuous across a row
    Edge,
    /// A parent that lies outside the loaded log window
    EndCommit(CommitId),
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Commit(_) => "commit",
            NodeKind::Edge => "edge",
            NodeKind::EndCommit(_) => "end",
        }
    }
}

/// One cell of the layout grid.
///
/// `up_edges` lead toward parents (rows further down the log),
/// `down_edges` lead toward children.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) row: RowIdx,
    pub(crate) branch: BranchId,
    pub(crate) kind: NodeKind,
    pub(crate) up_edges: SmallVec<[EdgeId; 2]>,
    pub(crate) down_edges: SmallVec<[EdgeId; 2]>,
}

impl Node {
    pub(crate) fn new(row: RowIdx, kind: NodeKind, branch: BranchId) -> Self {
        Self {
            row,
            branch,
            kind,
            up_edges: SmallVec::new(),
            down_edges: SmallVec::new(),
        }
    }

    pub fn row(&self) -> RowIdx {
        self.row
    }

    pub fn branch(&self) -> BranchId {
        self.branch
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Commit this node represents, if any
    pub fn commit_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Commit(id) | NodeKind::EndCommit(id) => Some(id),
            NodeKind::Edge => None,
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self.kind, NodeKind::Commit(_))
    }

    /// All incident edges toward parents, visible or not
    pub fn up_edges(&self) -> &[EdgeId] {
        &self.up_edges
    }

    /// All incident edges toward children, visible or not
    pub fn down_edges(&self) -> &[EdgeId] {
        &self.down_edges
    }
}
