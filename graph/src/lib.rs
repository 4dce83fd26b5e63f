pub mod core;
pub mod error;
pub mod git_backend;
pub mod layout;
pub mod model;
pub mod visibility;

#[cfg(test)]
mod test_support;

pub use crate::core::{Branch, BranchId, Commit, CommitDetails, CommitId, Edge, EdgeId, EdgeKind};
pub use crate::core::{Graph, GraphStats, Node, NodeId, NodeKind, NodeRow, RowIdx};
pub use error::{GraphError, Result};
pub use git_backend::GitWalker;
pub use layout::GraphBuilder;
pub use model::{FragmentController, GraphModel, RowView, UpdateEvent};
pub use visibility::{Element, Fragment, FragmentManager, VisibilityController};
