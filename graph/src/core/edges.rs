//! Edge controller: the only place that links and unlinks nodes.

use super::branch::BranchId;
use super::edge::{Edge, EdgeId, EdgeKind};
use super::graph::Graph;
use super::node::NodeId;
use crate::visibility::Element;

impl Graph {
    /// Link `down` (child side) to `up` (parent side).
    ///
    /// The edge is appended to both endpoints' incident lists.
    pub fn create_edge(&mut self, up: NodeId, down: NodeId, branch: BranchId, kind: EdgeKind) -> EdgeId {
        let edge = Edge {
            up,
            down,
            branch,
            kind,
        };
        self.edges.push(Some(edge));
        self.live_edges += 1;
        let id = EdgeId((self.edges.len() - 1) as u32);
        self.nodes[up.index()].down_edges.push(id);
        self.nodes[down.index()].up_edges.push(id);
        id
    }

    /// Unlink an edge from both endpoints. Returns false if it was not present.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.edges.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };
        self.nodes[edge.up.index()].down_edges.retain(|e| *e != id);
        self.nodes[edge.down.index()].up_edges.retain(|e| *e != id);
        // dead handles never stay in the hidden set
        self.visibility.show([Element::Edge(id)]);
        self.live_edges -= 1;
        true
    }

    /// Edges toward the node's parents
    pub fn up_edges(&self, node: NodeId) -> &[EdgeId] {
        self.node(node).up_edges()
    }

    /// Edges toward the node's children
    pub fn down_edges(&self, node: NodeId) -> &[EdgeId] {
        self.node(node).down_edges()
    }

    pub fn visible_up_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.up_edges(node)
            .iter()
            .copied()
            .filter(move |&edge| self.is_edge_visible(edge))
    }

    pub fn visible_down_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.down_edges(node)
            .iter()
            .copied()
            .filter(move |&edge| self.is_edge_visible(edge))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Branch, EdgeKind, Graph, NodeKind};
    use crate::visibility::Element;

    #[test]
    fn create_links_both_ends() {
        let mut graph = Graph::new();
        let branch = graph.add_branch(Branch::from_commit("a"));
        let row = graph.add_row();
        let child = graph.add_node(row, NodeKind::Commit("b".into()), branch);
        let row = graph.add_row();
        let parent = graph.add_node(row, NodeKind::Commit("a".into()), branch);

        let edge = graph.create_edge(parent, child, branch, EdgeKind::Usual);

        assert_eq!(graph.up_edges(child), &[edge]);
        assert_eq!(graph.down_edges(parent), &[edge]);
        let e = graph.edge(edge).unwrap();
        assert_eq!(e.up(), parent);
        assert_eq!(e.down(), child);
        assert_eq!(e.other(child), Some(parent));
    }

    #[test]
    fn remove_is_idempotent_and_retires_handle() {
        let mut graph = Graph::new();
        let branch = graph.add_branch(Branch::from_commit("a"));
        let row = graph.add_row();
        let child = graph.add_node(row, NodeKind::Commit("b".into()), branch);
        let row = graph.add_row();
        let parent = graph.add_node(row, NodeKind::Commit("a".into()), branch);
        let edge = graph.create_edge(parent, child, branch, EdgeKind::Usual);
        graph.visibility_mut().hide([Element::Edge(edge)]);

        assert!(graph.remove_edge(edge));
        assert!(!graph.remove_edge(edge));
        assert!(graph.up_edges(child).is_empty());
        assert!(graph.down_edges(parent).is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.edge(edge).is_none());

        assert_eq!(graph.visibility().hidden_count(), 0);

        let again = graph.create_edge(parent, child, branch, EdgeKind::Collapsed);
        assert_ne!(again, edge);
        assert!(graph.edge(edge).is_none());
        assert!(graph.is_edge_visible(again));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges().map(|(id, _)| id).collect::<Vec<_>>(), vec![again]);
    }

    #[test]
    fn visible_edges_skip_hidden() {
        let mut graph = Graph::new();
        let branch = graph.add_branch(Branch::from_commit("m"));
        let row = graph.add_row();
        let merge = graph.add_node(row, NodeKind::Commit("m".into()), branch);
        let row = graph.add_row();
        let a = graph.add_node(row, NodeKind::EndCommit("a".into()), branch);
        let b = graph.add_node(row, NodeKind::EndCommit("b".into()), branch);
        let to_a = graph.create_edge(a, merge, branch, EdgeKind::Usual);
        let to_b = graph.create_edge(b, merge, branch, EdgeKind::Usual);

        graph.visibility_mut().hide([Element::Edge(to_a)]);

        assert_eq!(graph.visible_up_edges(merge).collect::<Vec<_>>(), vec![to_b]);
        assert_eq!(graph.up_edges(merge).len(), 2);
    }

    #[test]
    fn edge_into_hidden_node_is_not_visible() {
        let mut graph = Graph::new();
        let branch = graph.add_branch(Branch::from_commit("a"));
        let row = graph.add_row();
        let child = graph.add_node(row, NodeKind::Commit("b".into()), branch);
        let row = graph.add_row();
        let parent = graph.add_node(row, NodeKind::Commit("a".into()), branch);
        let edge = graph.create_edge(parent, child, branch, EdgeKind::Usual);

        graph.visibility_mut().hide([Element::Node(parent)]);

        assert!(!graph.is_edge_visible(edge));
        assert_eq!(graph.visible_up_edges(child).count(), 0);
        assert_eq!(graph.visibility().hidden_count(), 1);

        graph.visibility_mut().show([Element::Node(parent)]);
        assert!(graph.is_edge_visible(edge));
    }
}
