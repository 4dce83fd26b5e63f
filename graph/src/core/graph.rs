use super::branch::{Branch, BranchId};
use super::commit::CommitId;
use super::edge::{Edge, EdgeId, EdgeKind};
use super::node::{Node, NodeId, NodeKind};
use super::row::{NodeRow, RowIdx};
use crate::visibility::{Element, VisibilityController};
use serde::Serialize;
use std::collections::HashMap;

/// Row-indexed commit graph for one log snapshot.
///
/// Nodes, edges and branch labels live in arenas addressed by handles that
/// stay valid for the lifetime of the graph. Nodes are never removed; only
/// their visibility changes. A removed edge leaves an empty slot behind and
/// its handle is never handed out again.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Option<Edge>>,
    pub(crate) live_edges: usize,
    pub(crate) branches: Vec<Branch>,
    pub(crate) rows: Vec<NodeRow>,
    /// commit id -> its commit node
    pub(crate) commits: HashMap<CommitId, NodeId>,
    pub(crate) visibility: VisibilityController,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_branch(&mut self, branch: Branch) -> BranchId {
        let id = BranchId(self.branches.len() as u32);
        self.branches.push(branch);
        id
    }

    /// Open the next row; indices are dense from 0
    pub(crate) fn add_row(&mut self) -> RowIdx {
        let index = self.rows.len();
        self.rows.push(NodeRow::new(index));
        index
    }

    /// Append a node to an existing row
    pub(crate) fn add_node(&mut self, row: RowIdx, kind: NodeKind, branch: BranchId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let NodeKind::Commit(commit) = &kind {
            self.commits.insert(commit.clone(), id);
        }
        self.nodes.push(Node::new(row, kind, branch));
        self.rows[row].push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Checked lookup for handles that may come from another graph
    pub fn try_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edge behind a handle, `None` once the edge was removed
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// All live edges
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, edge)| edge.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id.index()]
    }

    pub fn row(&self, index: RowIdx) -> Option<&NodeRow> {
        self.rows.get(index)
    }

    /// Every row, hidden or not
    pub fn rows(&self) -> &[NodeRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Node of a commit placed inside the log window
    pub fn commit_node(&self, commit: &str) -> Option<NodeId> {
        self.commits.get(commit).copied()
    }

    pub fn visibility(&self) -> &VisibilityController {
        &self.visibility
    }

    pub fn visibility_mut(&mut self) -> &mut VisibilityController {
        &mut self.visibility
    }

    pub fn is_node_visible(&self, node: NodeId) -> bool {
        self.visibility.is_visible(Element::Node(node))
    }

    /// Live, not hidden, and both endpoints visible
    pub fn is_edge_visible(&self, id: EdgeId) -> bool {
        match self.edge(id) {
            Some(edge) => {
                self.visibility.is_visible(Element::Edge(id))
                    && self.is_node_visible(edge.up)
                    && self.is_node_visible(edge.down)
            }
            None => false,
        }
    }

    /// Visible nodes of a row, in placement order
    pub fn visible_nodes(&self, row: RowIdx) -> impl Iterator<Item = NodeId> + '_ {
        self.rows
            .get(row)
            .map(|r| r.nodes())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |&node| self.is_node_visible(node))
    }

    /// A row is visible while it holds at least one visible node
    pub fn is_row_visible(&self, row: RowIdx) -> bool {
        self.visible_nodes(row).next().is_some()
    }

    /// Indices of the currently visible rows
    pub fn visible_rows(&self) -> Vec<RowIdx> {
        (0..self.rows.len())
            .filter(|&row| self.is_row_visible(row))
            .collect()
    }

    /// Raw row range an element touches, `None` for a removed edge
    pub fn element_rows(&self, element: Element) -> Option<(RowIdx, RowIdx)> {
        match element {
            Element::Node(node) => {
                let row = self.nodes.get(node.index())?.row;
                Some((row, row))
            }
            Element::Edge(edge) => {
                let edge = self.edge(edge)?;
                let down = self.node(edge.down).row;
                let up = self.node(edge.up).row;
                Some((down.min(up), down.max(up)))
            }
        }
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            rows: self.rows.len(),
            edges: self.edge_count(),
            ..GraphStats::default()
        };
        for node in &self.nodes {
            match node.kind {
                NodeKind::Commit(_) => {
                    stats.commit_nodes += 1;
                    if node.up_edges.len() > 1 {
                        stats.merges += 1;
                    }
                    if node.up_edges.is_empty() {
                        stats.roots += 1;
                    }
                }
                NodeKind::Edge => stats.edge_nodes += 1,
                NodeKind::EndCommit(_) => stats.end_nodes += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub rows: usize,
    pub commit_nodes: usize,
    /// Synthesized pass-through nodes
    pub edge_nodes: usize,
    /// Parents outside the log window
    pub end_nodes: usize,
    pub edges: usize,
    pub merges: usize,
    pub roots: usize,
}
