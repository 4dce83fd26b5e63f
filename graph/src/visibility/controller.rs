use crate::core::{EdgeId, NodeId};
use serde::Serialize;
use std::collections::HashSet;

/// Anything that can be hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Element {
    Node(NodeId),
    Edge(EdgeId),
}

/// Set of hidden graph elements.
///
/// Elements are visible unless hidden. Bulk operations are idempotent and
/// independent of the order elements are given in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityController {
    hidden: HashSet<Element>,
}

impl VisibilityController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, element: Element) -> bool {
        !self.hidden.contains(&element)
    }

    /// Hide elements, returning those that were visible before.
    ///
    /// Passing the result to `show` restores the previous state exactly.
    pub fn hide<I: IntoIterator<Item = Element>>(&mut self, elements: I) -> Vec<Element> {
        elements
            .into_iter()
            .filter(|element| self.hidden.insert(*element))
            .collect()
    }

    /// Show elements, returning those that were hidden before
    pub fn show<I: IntoIterator<Item = Element>>(&mut self, elements: I) -> Vec<Element> {
        elements
            .into_iter()
            .filter(|element| self.hidden.remove(element))
            .collect()
    }

    /// Make everything visible again, returning what was hidden
    pub fn show_all(&mut self) -> Vec<Element> {
        self.hidden.drain().collect()
    }

    pub fn hidden(&self) -> impl Iterator<Item = Element> + '_ {
        self.hidden.iter().copied()
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Lcg;

    fn random_element(rng: &mut Lcg) -> Element {
        let index = rng.below(16) as u32;
        if rng.below(2) == 0 {
            node(index)
        } else {
            edge(index)
        }
    }

    fn node(i: u32) -> Element {
        Element::Node(NodeId(i))
    }

    fn edge(i: u32) -> Element {
        Element::Edge(EdgeId(i))
    }

    #[test]
    fn visible_by_default() {
        let vis = VisibilityController::new();
        assert!(vis.is_visible(node(0)));
        assert!(vis.is_visible(edge(0)));
    }

    #[test]
    fn hide_is_idempotent() {
        let mut vis = VisibilityController::new();
        assert_eq!(vis.hide([node(1), edge(1)]), vec![node(1), edge(1)]);
        assert!(vis.hide([node(1)]).is_empty());
        assert!(!vis.is_visible(node(1)));
        assert!(vis.is_visible(edge(2)));
        assert_eq!(vis.hidden_count(), 2);
    }

    #[test]
    fn node_and_edge_with_same_index_are_distinct() {
        let mut vis = VisibilityController::new();
        vis.hide([node(3)]);
        assert!(vis.is_visible(edge(3)));
    }

    #[test]
    fn show_of_absent_is_noop() {
        let mut vis = VisibilityController::new();
        assert!(vis.show([node(9)]).is_empty());
        assert_eq!(vis, VisibilityController::new());
    }

    #[test]
    fn hide_then_show_restores_state() {
        let mut vis = VisibilityController::new();
        vis.hide([node(1)]);
        let before = vis.clone();

        // node(1) was already hidden, so undoing must leave it hidden
        let set = [node(1), node(2), edge(5)];
        let changed = vis.hide(set);
        assert_eq!(changed, vec![node(2), edge(5)]);
        vis.show(changed);
        assert_eq!(vis, before);

        let mut vis = before.clone();
        let fresh = [node(2), edge(5)];
        vis.hide(fresh);
        vis.show(fresh);
        assert_eq!(vis, before);

        let mut vis = before.clone();
        vis.hide([]);
        vis.show([]);
        assert_eq!(vis, before);
    }

    #[test]
    fn random_hide_show_round_trips() {
        let mut rng = Lcg::new(7);
        for _ in 0..50 {
            let mut vis = VisibilityController::new();
            let pre: Vec<Element> = (0..rng.below(20)).map(|_| random_element(&mut rng)).collect();
            vis.hide(pre);
            let before = vis.clone();

            // any set, overlapping or not, undone through what hide reports
            let set: Vec<Element> = (0..rng.below(30)).map(|_| random_element(&mut rng)).collect();
            let changed = vis.hide(set.iter().copied());
            vis.show(changed);
            assert_eq!(vis, before);

            // sets disjoint from the hidden ones undo with the same set
            let disjoint: Vec<Element> = set.into_iter().filter(|e| before.is_visible(*e)).collect();
            vis.hide(disjoint.iter().copied());
            vis.show(disjoint.iter().copied());
            assert_eq!(vis, before);
        }
    }

    #[test]
    fn show_all_drains() {
        let mut vis = VisibilityController::new();
        vis.hide([node(1), edge(2)]);
        let mut shown = vis.show_all();
        shown.sort();
        assert_eq!(shown, vec![node(1), edge(2)]);
        assert_eq!(vis.hidden_count(), 0);
    }
}
