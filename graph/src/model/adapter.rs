use super::events::{Listener, ListenerId, Listeners, UpdateEvent};
use crate::core::{Commit, EdgeId, EdgeKind, Graph, NodeId, NodeRow, RowIdx};
use crate::error::{GraphError, Result};
use crate::layout::GraphBuilder;
use crate::visibility::{AlwaysVisible, Element, Fragment, FragmentManager};
use std::collections::HashSet;
use tracing::debug;

/// What a UI layer consumes: the graph, its fragments and change events.
///
/// Every mutation goes through the model so listeners learn which range of
/// visible rows changed.
pub struct GraphModel {
    graph: Graph,
    fragments: FragmentManager,
    /// Raw indices of the visible rows, in order
    visible_rows: Vec<RowIdx>,
    listeners: Listeners,
}

/// A visible row, filtered to its visible nodes
#[derive(Clone, Copy)]
pub struct RowView<'a> {
    graph: &'a Graph,
    row: &'a NodeRow,
}

impl<'a> RowView<'a> {
    /// Raw row index in the full graph
    pub fn index(&self) -> RowIdx {
        self.row.index()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.graph.visible_nodes(self.row.index())
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().next().is_none()
    }
}

impl GraphModel {
    pub fn new(graph: Graph) -> Self {
        let visible_rows = graph.visible_rows();
        Self {
            graph,
            fragments: FragmentManager::default(),
            visible_rows,
            listeners: Listeners::new(),
        }
    }

    pub fn from_commits(commits: &[Commit]) -> Result<Self> {
        Ok(Self::new(GraphBuilder::build(commits)?))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Visible rows in order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = RowView<'_>> + '_ {
        self.visible_rows.iter().map(move |&row| RowView {
            graph: &self.graph,
            row: &self.graph.rows()[row],
        })
    }

    pub fn row(&self, visible_index: usize) -> Option<RowView<'_>> {
        let &row = self.visible_rows.get(visible_index)?;
        Some(RowView {
            graph: &self.graph,
            row: &self.graph.rows()[row],
        })
    }

    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// Position of a raw row among the visible rows
    pub fn visible_index(&self, row: RowIdx) -> Option<usize> {
        self.visible_rows.binary_search(&row).ok()
    }

    pub fn fragment_controller(&mut self) -> FragmentController<'_> {
        FragmentController { model: self }
    }

    pub fn fragment_manager(&self) -> &FragmentManager {
        &self.fragments
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn remove_all_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Hide elements and report the rows they touch
    pub fn hide(&mut self, elements: &[Element]) -> Result<()> {
        let changed = self.graph.visibility_mut().hide(elements.iter().copied());
        self.after_visibility_change(&changed)
    }

    /// Show elements and report the rows they touch
    pub fn show(&mut self, elements: &[Element]) -> Result<()> {
        let changed = self.graph.visibility_mut().show(elements.iter().copied());
        self.after_visibility_change(&changed)
    }

    /// Keep only what is reachable toward ancestors from the given heads.
    /// Collapsed fragments are expanded first.
    pub fn show_branches(&mut self, heads: &[&str]) -> Result<()> {
        let mut stack = Vec::with_capacity(heads.len());
        for head in heads {
            let node = self
                .graph
                .commit_node(head)
                .ok_or_else(|| GraphError::UnknownCommit(head.to_string()))?;
            stack.push(node);
        }

        self.fragments.expand_all(&mut self.graph);
        self.graph.visibility_mut().show_all();

        let mut reachable: HashSet<NodeId> = stack.iter().copied().collect();
        let mut kept_edges: HashSet<EdgeId> = HashSet::new();
        while let Some(node) = stack.pop() {
            for &edge in self.graph.up_edges(node) {
                let Some(up) = self.graph.edge(edge).map(|e| e.up()) else {
                    continue;
                };
                kept_edges.insert(edge);
                if reachable.insert(up) {
                    stack.push(up);
                }
            }
        }

        let hidden: Vec<Element> = self
            .graph
            .nodes()
            .map(|(id, _)| id)
            .filter(|id| !reachable.contains(id))
            .map(Element::Node)
            .chain(
                self.graph
                    .edges()
                    .map(|(id, _)| id)
                    .filter(|id| !kept_edges.contains(id))
                    .map(Element::Edge),
            )
            .collect();
        self.graph.visibility_mut().hide(hidden);
        debug!(heads = heads.len(), nodes = reachable.len(), "filtered to branches");
        self.refresh_all()
    }

    /// Undo `show_branches` and any manual hiding
    pub fn show_all_branches(&mut self) -> Result<()> {
        self.fragments.expand_all(&mut self.graph);
        self.graph.visibility_mut().show_all();
        self.refresh_all()
    }

    /// Swap in the graph of a new log snapshot. Fragment state is dropped,
    /// the pin predicate and listeners are kept.
    pub fn replace_commits(&mut self, commits: &[Commit]) -> Result<()> {
        let graph = GraphBuilder::build(commits)?;
        let old_rows = self.visible_rows.len();
        self.graph = graph;
        self.fragments.forget_collapsed();
        self.visible_rows = self.graph.visible_rows();
        let event = UpdateEvent::full(old_rows, self.visible_rows.len());
        self.listeners.dispatch(&event)
    }

    /// Refresh the rows spanned by the elements whose visibility changed
    fn after_visibility_change(&mut self, changed: &[Element]) -> Result<()> {
        let span = changed
            .iter()
            .filter_map(|&e| self.graph.element_rows(e))
            .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)));
        match span {
            Some((from, to)) => self.refresh_rows(from, to),
            None => Ok(()),
        }
    }

    fn refresh_all(&mut self) -> Result<()> {
        match self.graph.row_count() {
            0 => Ok(()),
            n => self.refresh_rows(0, n - 1),
        }
    }

    /// Recompute visibility of raw rows `from..=to` and notify listeners
    fn refresh_rows(&mut self, from: RowIdx, to: RowIdx) -> Result<()> {
        let start = self.visible_rows.partition_point(|&r| r < from);
        let end = self.visible_rows.partition_point(|&r| r <= to);
        let fresh: Vec<RowIdx> = (from..=to)
            .filter(|&row| self.graph.is_row_visible(row))
            .collect();
        let event = UpdateEvent {
            start,
            removed: end - start,
            inserted: fresh.len(),
        };
        self.visible_rows.splice(start..end, fresh);
        self.listeners.dispatch(&event)
    }

    /// Raw rows a fragment spans, child end first
    fn fragment_rows(&self, fragment: &Fragment) -> (RowIdx, RowIdx) {
        let down = self.graph.node(fragment.down_end()).row();
        let up = self.graph.node(fragment.up_end()).row();
        (down.min(up), down.max(up))
    }
}

/// Collapse and expand fragments through the model, notifying listeners
pub struct FragmentController<'a> {
    model: &'a mut GraphModel,
}

impl FragmentController<'_> {
    pub fn fragments(&self) -> Vec<Fragment> {
        self.model.fragments.fragments(&self.model.graph)
    }

    pub fn fragment_containing(&self, node: NodeId) -> Option<Fragment> {
        self.model
            .fragments
            .fragment_containing(&self.model.graph, node)
    }

    /// The fragment behind a collapsed summary edge
    pub fn fragment_for_summary(&self, edge: EdgeId) -> Option<Fragment> {
        let kind = self.model.graph.edge(edge)?.kind();
        if kind != EdgeKind::Collapsed {
            return None;
        }
        self.model.fragments.fragment_for_summary(edge).cloned()
    }

    pub fn is_collapsed(&self, fragment: &Fragment) -> bool {
        self.model.fragments.is_collapsed(fragment)
    }

    pub fn set_always_visible(&mut self, always_visible: AlwaysVisible) {
        self.model.fragments.set_always_visible(always_visible);
    }

    pub fn collapse(&mut self, fragment: &Fragment) -> Result<EdgeId> {
        let model = &mut *self.model;
        let summary = model.fragments.collapse(&mut model.graph, fragment)?;
        let (from, to) = model.fragment_rows(fragment);
        model.refresh_rows(from, to)?;
        Ok(summary)
    }

    pub fn expand(&mut self, fragment: &Fragment) -> Result<()> {
        let model = &mut *self.model;
        model.fragments.expand(&mut model.graph, fragment)?;
        let (from, to) = model.fragment_rows(fragment);
        model.refresh_rows(from, to)
    }

    /// Collapse everything collapsible, then report one full replacement
    pub fn collapse_all(&mut self) -> Result<Vec<Fragment>> {
        let model = &mut *self.model;
        let collapsed = model.fragments.collapse_all(&mut model.graph)?;
        if !collapsed.is_empty() {
            model.refresh_all()?;
        }
        Ok(collapsed)
    }

    pub fn expand_all(&mut self) -> Result<Vec<Fragment>> {
        let model = &mut *self.model;
        let expanded = model.fragments.expand_all(&mut model.graph);
        if !expanded.is_empty() {
            model.refresh_all()?;
        }
        Ok(expanded)
    }
}
