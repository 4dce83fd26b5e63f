use chrono::SecondsFormat;
use log_graph::{Commit, CommitDetails, EdgeKind, GraphModel, GraphStats, NodeId, NodeKind};
use serde::Serialize;
use std::collections::HashMap;

/// Palette size handed to `Branch::color_index`
pub const PALETTE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    /// Raw row index
    pub index: usize,
    pub nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub branch: String,
    pub color: usize,
    /// Nodes reached through visible up edges
    pub parents: Vec<NodeId>,
    /// Has a collapsed fragment above it
    pub folded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CommitDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentReport {
    pub id: NodeId,
    pub down_end: String,
    pub up_end: String,
    pub nodes: usize,
    pub collapsed: bool,
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Visible rows of the model, joined with the commits' display data
pub fn row_reports(model: &GraphModel, commits: &[Commit]) -> Vec<RowReport> {
    let details: HashMap<&str, &CommitDetails> = commits
        .iter()
        .filter_map(|c| c.details.as_ref().map(|d| (c.id.as_str(), d)))
        .collect();
    let graph = model.graph();

    model
        .rows()
        .map(|row| RowReport {
            index: row.index(),
            nodes: row
                .nodes()
                .map(|id| {
                    let node = graph.node(id);
                    let branch = graph.branch(node.branch());
                    let up: Vec<_> = graph
                        .visible_up_edges(id)
                        .filter_map(|e| graph.edge(e))
                        .collect();
                    NodeReport {
                        id,
                        kind: node.kind().as_str(),
                        commit: node.commit_id().map(str::to_string),
                        branch: branch.to_string(),
                        color: branch.color_index(PALETTE),
                        parents: up.iter().map(|e| e.up()).collect(),
                        folded: up.iter().any(|e| e.kind() == EdgeKind::Collapsed),
                        details: node
                            .commit_id()
                            .and_then(|c| details.get(c))
                            .map(|d| (*d).clone()),
                    }
                })
                .collect(),
        })
        .collect()
}

/// One line per row: grid cells, then the row's commit summary
pub fn render_rows(rows: &[RowReport]) -> String {
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row.nodes.iter().map(cell).collect();
        out.push_str(&format!("{:>4}  {}", row.index, cells.join(" ")));
        for node in &row.nodes {
            if let Some(details) = &node.details {
                out.push_str(&format!(
                    "  {} {} ({}, {})",
                    short(node.commit.as_deref().unwrap_or_default()),
                    details.summary,
                    details.author,
                    details.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
                ));
            }
        }
        out.push('\n');
    }
    out
}

fn cell(node: &NodeReport) -> String {
    let id = short(node.commit.as_deref().unwrap_or_default());
    let mut cell = match node.kind {
        "commit" => format!("*{}", id),
        "end" => format!("~{}", id),
        _ => "|".to_string(),
    };
    if node.folded {
        cell.push('+');
    }
    cell
}

/// Open and collapsed fragments, open ones first
pub fn fragment_reports(model: &GraphModel) -> Vec<FragmentReport> {
    let graph = model.graph();
    let manager = model.fragment_manager();
    let label = |id: NodeId| match graph.node(id).kind() {
        NodeKind::Commit(c) | NodeKind::EndCommit(c) => short(c).to_string(),
        NodeKind::Edge => id.to_string(),
    };

    let mut collapsed: Vec<_> = manager.collapsed_fragments().collect();
    collapsed.sort_by_key(|f| f.id());

    manager
        .fragments(graph)
        .iter()
        .map(|f| (f, false))
        .chain(collapsed.into_iter().map(|f| (f, true)))
        .map(|(f, collapsed)| FragmentReport {
            id: f.id(),
            down_end: label(f.down_end()),
            up_end: label(f.up_end()),
            nodes: f.len(),
            collapsed,
        })
        .collect()
}

pub fn render_fragments(fragments: &[FragmentReport]) -> String {
    fragments
        .iter()
        .map(|f| {
            let state = if f.collapsed { "collapsed" } else { "open" };
            format!(
                "{:<6} {} .. {}  {} nodes  {}\n",
                f.id.to_string(),
                f.down_end,
                f.up_end,
                f.nodes,
                state
            )
        })
        .collect()
}

pub fn render_stats(stats: &GraphStats) -> String {
    [
        ("rows", stats.rows),
        ("commits", stats.commit_nodes),
        ("merges", stats.merges),
        ("roots", stats.roots),
        ("pass-through", stats.edge_nodes),
        ("end nodes", stats.end_nodes),
        ("edges", stats.edges),
    ]
    .iter()
    .map(|(label, value)| format!("{:<15}{}\n", format!("{}:", label), value))
    .collect()
}
