use crate::core::{Branch, BranchId, Commit, CommitId, EdgeKind, Graph, NodeId, NodeKind, RowIdx};
use crate::error::{GraphError, Result};
use std::collections::HashMap;
use tracing::debug;

/// A parent referenced by a child but not placed yet
#[derive(Debug)]
struct PendingNode {
    /// Label the parent's node will carry
    branch: BranchId,
    /// Lane slot holding this entry
    lane: usize,
    /// Node (on the previous row) waiting for an edge, with that edge's label
    first: (NodeId, BranchId),
    /// Second child reaching the same parent from another side
    second: Option<(NodeId, BranchId)>,
}

/// Builds a row-indexed graph from commits in log order.
///
/// One pass over the log. Row `i` holds the commit at log position `i`;
/// parents still waiting for their own row are carried forward row by row
/// through pass-through `NodeKind::Edge` nodes, so every `Usual` edge to a
/// later parent links two adjacent rows. A parent placed above its child is
/// wired directly. Parents that never show up end in one extra row of
/// `NodeKind::EndCommit` nodes.
pub struct GraphBuilder {
    graph: Graph,
    /// commit id -> log position, i.e. the row it will land on
    log_index: HashMap<CommitId, usize>,
    last_log_index: usize,
    pending: HashMap<CommitId, PendingNode>,
    /// Pending parents in a stable order; freed slots are reused
    lanes: Vec<Option<CommitId>>,
    pass_through: usize,
    /// Edges to parents placed above their child
    backward: usize,
}

impl GraphBuilder {
    /// Build the whole graph. Input is validated before any node is created.
    pub fn build(commits: &[Commit]) -> Result<Graph> {
        if commits.is_empty() {
            return Err(GraphError::EmptyInput);
        }
        let log_index = index_commits(commits)?;

        let mut builder = Self {
            graph: Graph::new(),
            log_index,
            last_log_index: commits.len() - 1,
            pending: HashMap::new(),
            lanes: Vec::new(),
            pass_through: 0,
            backward: 0,
        };
        for commit in commits {
            builder.append(commit);
        }
        Ok(builder.finish())
    }

    fn append(&mut self, commit: &Commit) {
        let row = self.graph.add_row();
        self.continue_pending(row);
        let (node, lane) = self.place_commit(commit, row);
        self.add_parents(node, commit, row, lane);
    }

    /// Row a commit will be placed on; unknown commits land past the end
    fn target_row(&self, commit: &str) -> RowIdx {
        self.log_index
            .get(commit)
            .copied()
            .unwrap_or(self.last_log_index + 1)
    }

    /// Carry every pending parent that does not belong on `row` through it
    fn continue_pending(&mut self, row: RowIdx) {
        for lane in 0..self.lanes.len() {
            let Some(parent) = &self.lanes[lane] else {
                continue;
            };
            if self.target_row(parent) == row {
                continue;
            }
            let Some(pending) = self.pending.get_mut(parent) else {
                continue;
            };

            let pass = self.graph.add_node(row, NodeKind::Edge, pending.branch);
            link(&mut self.graph, pass, pending.first);
            if let Some(second) = pending.second.take() {
                link(&mut self.graph, pass, second);
            }
            pending.first = (pass, pending.branch);
            self.pass_through += 1;
        }
    }

    /// Put the commit's node on its row, closing its pending entry if any.
    /// Returns the node and the lane it freed.
    fn place_commit(&mut self, commit: &Commit, row: RowIdx) -> (NodeId, Option<usize>) {
        let kind = NodeKind::Commit(commit.id.clone());
        match self.pending.remove(&commit.id) {
            Some(pending) => {
                self.lanes[pending.lane] = None;
                let lane = pending.lane;
                let node = self.graph.add_node(row, kind, pending.branch);
                close(&mut self.graph, node, pending);
                (node, Some(lane))
            }
            None => {
                let branch = self.graph.add_branch(Branch::from_commit(&commit.id));
                (self.graph.add_node(row, kind, branch), None)
            }
        }
    }

    fn add_parents(&mut self, node: NodeId, commit: &Commit, row: RowIdx, lane: Option<usize>) {
        let own = self.graph.node(node).branch();
        let mut preferred = lane;
        for parent in &commit.parents {
            let branch = if commit.is_merge() {
                self.graph
                    .add_branch(Branch::new(commit.id.clone(), parent.clone()))
            } else {
                own
            };
            self.add_parent(node, parent, branch, row, preferred.take());
        }
    }

    fn add_parent(
        &mut self,
        child: NodeId,
        parent: &CommitId,
        branch: BranchId,
        row: RowIdx,
        preferred: Option<usize>,
    ) {
        if let Some(pending) = self.pending.get_mut(parent) {
            // The next row either holds the parent itself, which then takes
            // both edges, or merges both lines into one pass-through node.
            debug_assert!(pending.second.is_none());
            pending.second = Some((child, branch));
            return;
        }

        if let Some(placed) = self.graph.commit_node(parent) {
            // Parent sits above its child in the log. Rows are built
            // forward, so there is no line to carry; wire it directly.
            debug!(parent = %parent, row, "parent precedes its child in the log");
            self.backward += 1;
            link(&mut self.graph, placed, (child, branch));
            return;
        }
        let lane = self.claim_lane(parent, preferred);
        self.pending.insert(
            parent.clone(),
            PendingNode {
                branch,
                lane,
                first: (child, branch),
                second: None,
            },
        );
    }

    /// Preferred slot if free, else first free slot, else a new one
    fn claim_lane(&mut self, parent: &CommitId, preferred: Option<usize>) -> usize {
        let lane = preferred
            .filter(|&lane| self.lanes[lane].is_none())
            .or_else(|| self.lanes.iter().position(Option::is_none))
            .unwrap_or(self.lanes.len());
        if lane == self.lanes.len() {
            self.lanes.push(None);
        }
        self.lanes[lane] = Some(parent.clone());
        lane
    }

    /// Close parents that never appeared with end nodes on one final row
    fn finish(mut self) -> Graph {
        let mut end_nodes = 0;
        if !self.pending.is_empty() {
            let row = self.graph.add_row();
            for lane in 0..self.lanes.len() {
                let Some(parent) = self.lanes[lane].take() else {
                    continue;
                };
                let Some(pending) = self.pending.remove(&parent) else {
                    continue;
                };
                let node = self
                    .graph
                    .add_node(row, NodeKind::EndCommit(parent), pending.branch);
                close(&mut self.graph, node, pending);
                end_nodes += 1;
            }
        }
        debug_assert!(self.pending.is_empty());

        debug!(
            rows = self.graph.row_count(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            pass_through = self.pass_through,
            backward = self.backward,
            end_nodes,
            "built commit graph"
        );
        self.graph
    }
}

/// Wire a waiting child to the parent-side node
fn link(graph: &mut Graph, up: NodeId, (down, branch): (NodeId, BranchId)) {
    graph.create_edge(up, down, branch, EdgeKind::Usual);
}

fn close(graph: &mut Graph, node: NodeId, pending: PendingNode) {
    link(graph, node, pending.first);
    if let Some(second) = pending.second {
        link(graph, node, second);
    }
}

/// Map every commit to its log position, rejecting malformed input
fn index_commits(commits: &[Commit]) -> Result<HashMap<CommitId, usize>> {
    let mut index = HashMap::with_capacity(commits.len());
    for (position, commit) in commits.iter().enumerate() {
        if let Some(first) = index.insert(commit.id.clone(), position) {
            return Err(GraphError::DuplicateCommit {
                id: commit.id.clone(),
                first,
                second: position,
            });
        }
        for (i, parent) in commit.parents.iter().enumerate() {
            if *parent == commit.id {
                return Err(GraphError::SelfParent(commit.id.clone()));
            }
            if commit.parents[..i].contains(parent) {
                return Err(GraphError::DuplicateParent {
                    id: commit.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Node;
    use crate::test_support::generated_log;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn commit(id: &str, parents: &[&str]) -> Commit {
        Commit::new(id, parents.iter().map(|p| p.to_string()).collect())
    }

    fn kinds(graph: &Graph, row: RowIdx) -> Vec<NodeKind> {
        graph.rows()[row]
            .nodes()
            .iter()
            .map(|&n| graph.node(n).kind().clone())
            .collect()
    }

    /// Nodes reached through a node's up edges
    fn parents_of(graph: &Graph, node: NodeId) -> Vec<&Node> {
        graph
            .up_edges(node)
            .iter()
            .map(|&e| graph.node(graph.edge(e).unwrap().up()))
            .collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(GraphBuilder::build(&[]), Err(GraphError::EmptyInput)));
    }

    #[test]
    fn malformed_input_is_rejected() {
        let self_parent = vec![commit("a", &["a"])];
        assert!(matches!(
            GraphBuilder::build(&self_parent),
            Err(GraphError::SelfParent(id)) if id == "a"
        ));

        let duplicate = vec![commit("a", &["b"]), commit("b", &[]), commit("a", &[])];
        assert!(matches!(
            GraphBuilder::build(&duplicate),
            Err(GraphError::DuplicateCommit { first: 0, second: 2, .. })
        ));

        let twice = vec![commit("m", &["p", "p"]), commit("p", &[])];
        assert!(matches!(
            GraphBuilder::build(&twice),
            Err(GraphError::DuplicateParent { .. })
        ));
    }

    #[test]
    fn linear_pair() {
        let graph = GraphBuilder::build(&[commit("c2", &["c1"]), commit("c1", &[])]).unwrap();

        assert_eq!(graph.row_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
        let c2 = graph.commit_node("c2").unwrap();
        let c1 = graph.commit_node("c1").unwrap();
        let edge = graph.edge(graph.up_edges(c2)[0]).unwrap();
        assert_eq!(edge.up(), c1);
        assert_eq!(edge.down(), c2);
        assert_eq!(graph.node(c1).branch(), graph.node(c2).branch());
    }

    #[test]
    fn parent_above_child_is_wired_directly() {
        let graph = GraphBuilder::build(&[commit("c1", &[]), commit("c2", &["c1"])]).unwrap();

        assert_eq!(graph.row_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let stats = graph.stats();
        assert_eq!((stats.edge_nodes, stats.end_nodes), (0, 0));

        let c1 = graph.commit_node("c1").unwrap();
        let c2 = graph.commit_node("c2").unwrap();
        let edge = graph.edge(graph.up_edges(c2)[0]).unwrap();
        assert_eq!((edge.up(), edge.down()), (c1, c2));
    }

    #[test]
    fn merge_of_earlier_commits() {
        let commits = vec![commit("c1", &[]), commit("c2", &[]), commit("m", &["c1", "c2"])];
        let graph = GraphBuilder::build(&commits).unwrap();

        assert_eq!(graph.row_count(), 3);
        assert_eq!(kinds(&graph, 2), vec![NodeKind::Commit("m".into())]);
        let m = graph.commit_node("m").unwrap();
        let parents: Vec<_> = parents_of(&graph, m)
            .into_iter()
            .map(|n| n.kind().clone())
            .collect();
        assert_eq!(
            parents,
            vec![NodeKind::Commit("c1".into()), NodeKind::Commit("c2".into())]
        );

        let branches: Vec<_> = graph
            .up_edges(m)
            .iter()
            .map(|&e| graph.branch(graph.edge(e).unwrap().branch()).clone())
            .collect();
        assert_eq!(
            branches,
            vec![
                Branch::new("m".into(), "c1".into()),
                Branch::new("m".into(), "c2".into())
            ]
        );
    }

    #[test]
    fn merge_into_later_commits() {
        let commits = vec![commit("m", &["a", "b"]), commit("a", &[]), commit("b", &[])];
        let graph = GraphBuilder::build(&commits).unwrap();

        assert_eq!(graph.row_count(), 3);
        assert_eq!(kinds(&graph, 1), vec![NodeKind::Edge, NodeKind::Commit("a".into())]);
        let a = graph.commit_node("a").unwrap();
        let b = graph.commit_node("b").unwrap();
        assert_eq!(graph.branch(graph.node(a).branch()), &Branch::new("m".into(), "a".into()));
        assert_eq!(graph.branch(graph.node(b).branch()), &Branch::new("m".into(), "b".into()));
    }

    #[test]
    fn pass_through_keeps_line_continuous() {
        let commits = vec![commit("c1", &["p"]), commit("c2", &[]), commit("p", &[])];
        let graph = GraphBuilder::build(&commits).unwrap();

        assert_eq!(graph.row_count(), 3);
        assert_eq!(kinds(&graph, 1), vec![NodeKind::Edge, NodeKind::Commit("c2".into())]);
        assert_eq!(graph.stats().edge_nodes, 1);

        let pass = graph.rows()[1].nodes()[0];
        let c1 = graph.commit_node("c1").unwrap();
        let p = graph.commit_node("p").unwrap();
        assert_eq!(parents_of(&graph, c1)[0].kind(), &NodeKind::Edge);
        assert_eq!(
            parents_of(&graph, pass)[0].commit_id(),
            graph.node(p).commit_id()
        );
        assert_eq!(graph.node(pass).branch(), graph.node(c1).branch());
    }

    #[test]
    fn unresolved_parent_ends_the_window() {
        let graph = GraphBuilder::build(&[commit("c1", &["x"])]).unwrap();

        assert_eq!(graph.row_count(), 2);
        assert_eq!(kinds(&graph, 1), vec![NodeKind::EndCommit("x".into())]);
        let c1 = graph.commit_node("c1").unwrap();
        assert_eq!(graph.up_edges(c1).len(), 1);
        assert_eq!(graph.commit_node("x"), None);
    }

    #[test]
    fn two_children_meeting_on_next_row() {
        // a and b both have p as parent; p is right below b
        let commits = vec![commit("a", &["p"]), commit("b", &["p"]), commit("p", &[])];
        let graph = GraphBuilder::build(&commits).unwrap();

        // a's line passes row 1, then both reach p directly
        assert_eq!(graph.stats().edge_nodes, 1);
        let p = graph.commit_node("p").unwrap();
        assert_eq!(graph.down_edges(p).len(), 2);
    }

    #[test]
    fn two_children_merge_into_one_pass_through() {
        // a and b both have p as parent, but c sits between b and p
        let commits = vec![
            commit("a", &["p"]),
            commit("b", &["p"]),
            commit("c", &[]),
            commit("p", &[]),
        ];
        let graph = GraphBuilder::build(&commits).unwrap();

        // row 1: pass-through for a's line; row 2: one node joining both lines
        assert_eq!(kinds(&graph, 2), vec![NodeKind::Edge, NodeKind::Commit("c".into())]);
        let joined = graph.rows()[2].nodes()[0];
        assert_eq!(graph.down_edges(joined).len(), 2);
        assert_eq!(graph.up_edges(joined).len(), 1);

        let p = graph.commit_node("p").unwrap();
        assert_eq!(graph.down_edges(p).len(), 1);
        assert_eq!(graph.stats().edge_nodes, 2);
    }

    #[test]
    fn second_child_of_missing_parent() {
        let commits = vec![commit("a", &["x"]), commit("b", &["x"])];
        let graph = GraphBuilder::build(&commits).unwrap();

        assert_eq!(graph.row_count(), 3);
        let end = graph.rows()[2].nodes()[0];
        assert_eq!(graph.node(end).kind(), &NodeKind::EndCommit("x".into()));
        assert_eq!(graph.down_edges(end).len(), 2);
    }

    fn check_invariants(commits: &[Commit], graph: &Graph) {
        // dense rows, each node in exactly the row it names
        let mut seen = HashSet::new();
        for (i, row) in graph.rows().iter().enumerate() {
            assert_eq!(row.index(), i);
            for &node in row.nodes() {
                assert!(seen.insert(node), "node {node} placed twice");
                assert_eq!(graph.node(node).row(), i);
            }
        }
        assert_eq!(seen.len(), graph.node_count());

        let stats = graph.stats();
        assert_eq!(
            graph.node_count(),
            commits.len() + stats.edge_nodes + stats.end_nodes
        );

        for (position, commit) in commits.iter().enumerate() {
            let node = graph.commit_node(&commit.id).unwrap();
            assert_eq!(graph.node(node).row(), position);
            assert_eq!(graph.up_edges(node).len(), commit.parents.len());
        }

        for (_, edge) in graph.edges() {
            assert_eq!(edge.kind(), EdgeKind::Usual);
            let up = graph.node(edge.up());
            let down_row = graph.node(edge.down()).row();
            if up.row() <= down_row {
                // only a commit placed above its child is reached backward
                assert!(up.is_commit());
                assert!(graph.node(edge.down()).is_commit());
            } else {
                assert_eq!(up.row(), down_row + 1);
            }
        }

        for (id, node) in graph.nodes() {
            match node.kind() {
                NodeKind::Edge => {
                    assert_eq!(node.up_edges().len(), 1, "pass-through {id}");
                    assert!(!node.down_edges().is_empty());
                }
                NodeKind::EndCommit(_) => {
                    assert!(node.up_edges().is_empty());
                    assert_eq!(node.row(), commits.len());
                }
                NodeKind::Commit(_) => {}
            }
        }
    }

    #[test]
    fn generated_logs_hold_invariants() {
        for seed in 0..40 {
            let commits = generated_log(seed, 60, true);
            let graph = GraphBuilder::build(&commits).unwrap();
            check_invariants(&commits, &graph);
        }
    }

    #[test]
    fn closed_logs_need_no_end_row() {
        for seed in 0..40 {
            let commits = generated_log(seed, 40, false);
            let graph = GraphBuilder::build(&commits).unwrap();
            check_invariants(&commits, &graph);
            assert_eq!(graph.row_count(), commits.len());
            assert_eq!(graph.stats().end_nodes, 0);
        }
    }
}
