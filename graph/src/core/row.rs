use super::node::NodeId;

/// Row index in the layout grid, equal to the log position
pub type RowIdx = usize;

/// Nodes sharing one row, in the order they were placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    index: RowIdx,
    nodes: Vec<NodeId>,
}

impl NodeRow {
    pub(crate) fn new(index: RowIdx) -> Self {
        Self {
            index,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub fn index(&self) -> RowIdx {
        self.index
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
