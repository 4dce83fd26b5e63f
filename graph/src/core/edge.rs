use super::branch::BranchId;
use super::node::NodeId;
use serde::Serialize;
use std::fmt;

/// Stable handle of an edge in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A directed link between a parent-side and a child-side node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Parent side
    pub(crate) up: NodeId,
    /// Child side
    pub(crate) down: NodeId,
    pub(crate) branch: BranchId,
    pub(crate) kind: EdgeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind {
    /// Part of the built topology
    Usual,
    /// Summary edge standing in for a collapsed fragment
    Collapsed,
}

impl Edge {
    pub fn up(&self) -> NodeId {
        self.up
    }

    pub fn down(&self) -> NodeId {
        self.down
    }

    pub fn branch(&self) -> BranchId {
        self.branch
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint at all
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.up {
            Some(self.down)
        } else if node == self.down {
            Some(self.up)
        } else {
            None
        }
    }
}
