//! Collapsible runs of the graph.
//!
//! A fragment is a maximal chain of visible nodes that each have exactly one
//! visible up edge and one visible down edge. Collapsing hides the chain and
//! links its two boundary nodes with a single `EdgeKind::Collapsed` edge.

use super::controller::Element;
use crate::core::{EdgeId, EdgeKind, Graph, Node, NodeId};
use crate::error::{GraphError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Decides which nodes must never disappear into a fragment
pub type AlwaysVisible = Box<dyn Fn(&Node) -> bool>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Boundary on the child side
    down_end: NodeId,
    /// Boundary on the parent side
    up_end: NodeId,
    /// Interior nodes, child side first
    nodes: Vec<NodeId>,
    /// Chain edges from `down_end` to `up_end`, one more than `nodes`
    edges: Vec<EdgeId>,
}

impl Fragment {
    /// Identity of the fragment: its first interior node
    pub fn id(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn down_end(&self) -> NodeId {
        self.down_end
    }

    pub fn up_end(&self) -> NodeId {
        self.up_end
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Interior nodes and chain edges, the set a collapse hides
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.nodes
            .iter()
            .map(|&n| Element::Node(n))
            .chain(self.edges.iter().map(|&e| Element::Edge(e)))
    }
}

#[derive(Debug)]
struct Collapsed {
    fragment: Fragment,
    summary: EdgeId,
}

/// Finds fragments and collapses or expands them
pub struct FragmentManager {
    always_visible: AlwaysVisible,
    /// fragment id -> collapse record
    collapsed: HashMap<NodeId, Collapsed>,
}

impl Default for FragmentManager {
    fn default() -> Self {
        Self::new(Box::new(|_: &Node| false))
    }
}

impl FragmentManager {
    pub fn new(always_visible: AlwaysVisible) -> Self {
        Self {
            always_visible,
            collapsed: HashMap::new(),
        }
    }

    /// Replace the pin predicate. Collapsed fragments stay collapsed.
    pub fn set_always_visible(&mut self, always_visible: AlwaysVisible) {
        self.always_visible = always_visible;
    }

    pub fn is_always_visible(&self, node: &Node) -> bool {
        (self.always_visible)(node)
    }

    /// Drop collapse records without touching any graph, used when the
    /// graph they referred to is replaced
    pub fn forget_collapsed(&mut self) {
        self.collapsed.clear();
    }

    /// Every fragment of the currently visible graph, in row order
    pub fn fragments(&self, graph: &Graph) -> Vec<Fragment> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for row in graph.rows() {
            for &node in row.nodes() {
                if seen.contains(&node) {
                    continue;
                }
                if let Some(fragment) = self.chain_through(graph, node) {
                    seen.extend(fragment.nodes.iter().copied());
                    found.push(fragment);
                }
            }
        }
        found
    }

    /// The fragment whose interior holds `node`
    pub fn fragment_containing(&self, graph: &Graph, node: NodeId) -> Option<Fragment> {
        self.chain_through(graph, node)
    }

    /// The collapsed fragment a summary edge stands for
    pub fn fragment_for_summary(&self, edge: EdgeId) -> Option<&Fragment> {
        self.collapsed
            .values()
            .find(|c| c.summary == edge)
            .map(|c| &c.fragment)
    }

    pub fn is_collapsed(&self, fragment: &Fragment) -> bool {
        self.collapsed.contains_key(&fragment.id())
    }

    pub fn collapsed_fragments(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.collapsed.values().map(|c| &c.fragment)
    }

    /// Hide the fragment's interior and link its ends with a summary edge
    pub fn collapse(&mut self, graph: &mut Graph, fragment: &Fragment) -> Result<EdgeId> {
        if self.is_collapsed(fragment) {
            return Err(GraphError::AlreadyCollapsed(fragment.id()));
        }
        if fragment.is_empty() || self.chain_through(graph, fragment.id()).as_ref() != Some(fragment) {
            return Err(GraphError::StaleFragment(fragment.id()));
        }

        let branch = graph
            .edge(fragment.edges[0])
            .map(|e| e.branch())
            .ok_or(GraphError::StaleFragment(fragment.id()))?;
        graph.visibility_mut().hide(fragment.elements());
        let summary = graph.create_edge(fragment.up_end, fragment.down_end, branch, EdgeKind::Collapsed);

        debug!(fragment = %fragment.id(), nodes = fragment.len(), %summary, "collapsed fragment");
        self.collapsed.insert(
            fragment.id(),
            Collapsed {
                fragment: fragment.clone(),
                summary,
            },
        );
        Ok(summary)
    }

    /// Undo `collapse`: drop the summary edge and show the interior again
    pub fn expand(&mut self, graph: &mut Graph, fragment: &Fragment) -> Result<()> {
        let id = fragment.id();
        let stale = match self.collapsed.get(&id) {
            None => return Err(GraphError::NotCollapsed(id)),
            Some(record) => record.fragment != *fragment,
        };
        if stale {
            return Err(GraphError::StaleFragment(id));
        }
        let Some(collapsed) = self.collapsed.remove(&id) else {
            return Err(GraphError::NotCollapsed(id));
        };
        graph.remove_edge(collapsed.summary);
        graph.visibility_mut().show(collapsed.fragment.elements());
        debug!(fragment = %fragment.id(), nodes = fragment.len(), "expanded fragment");
        Ok(())
    }

    /// Collapse every fragment of the visible graph
    pub fn collapse_all(&mut self, graph: &mut Graph) -> Result<Vec<Fragment>> {
        let fragments = self.fragments(graph);
        for fragment in &fragments {
            self.collapse(graph, fragment)?;
        }
        Ok(fragments)
    }

    /// Expand every collapsed fragment
    pub fn expand_all(&mut self, graph: &mut Graph) -> Vec<Fragment> {
        let mut expanded = Vec::with_capacity(self.collapsed.len());
        for (_, collapsed) in self.collapsed.drain() {
            graph.remove_edge(collapsed.summary);
            graph.visibility_mut().show(collapsed.fragment.elements());
            expanded.push(collapsed.fragment);
        }
        expanded.sort_by_key(|f| f.id());
        expanded
    }

    /// The up and down edge a node would be chained through, if it can sit
    /// inside a fragment at all
    fn chain_links(&self, graph: &Graph, node: NodeId) -> Option<(EdgeId, EdgeId)> {
        let candidate = graph.try_node(node)?;
        if !graph.is_node_visible(node) || self.is_always_visible(candidate) {
            return None;
        }
        let up = sole_usual_edge(graph, graph.visible_up_edges(node))?;
        let down = sole_usual_edge(graph, graph.visible_down_edges(node))?;
        Some((up, down))
    }

    /// Grow the maximal chain through `seed` in both directions
    fn chain_through(&self, graph: &Graph, seed: NodeId) -> Option<Fragment> {
        let (seed_up, seed_down) = self.chain_links(graph, seed)?;
        let mut nodes = VecDeque::from([seed]);
        let mut edges = VecDeque::new();

        let mut edge = seed_down;
        let down_end = loop {
            edges.push_front(edge);
            let next = graph.edge(edge)?.down();
            if next == seed {
                // a cycle in malformed input, no ends to collapse between
                return None;
            }
            match self.chain_links(graph, next) {
                Some((_, down)) => {
                    nodes.push_front(next);
                    edge = down;
                }
                None => break next,
            }
        };

        let mut edge = seed_up;
        let up_end = loop {
            edges.push_back(edge);
            let next = graph.edge(edge)?.up();
            if next == seed {
                return None;
            }
            match self.chain_links(graph, next) {
                Some((up, _)) => {
                    nodes.push_back(next);
                    edge = up;
                }
                None => break next,
            }
        };

        Some(Fragment {
            down_end,
            up_end,
            nodes: nodes.into(),
            edges: edges.into(),
        })
    }
}

/// The only edge of an iterator, provided it is a `Usual` edge.
/// A visible summary edge disqualifies the node.
fn sole_usual_edge(graph: &Graph, mut edges: impl Iterator<Item = EdgeId>) -> Option<EdgeId> {
    let edge = edges.next()?;
    if edges.next().is_some() {
        return None;
    }
    match graph.edge(edge)?.kind() {
        EdgeKind::Usual => Some(edge),
        EdgeKind::Collapsed => None,
    }
}
