pub mod branch;
pub mod commit;
pub mod edge;
mod edges;
pub mod graph;
pub mod node;
pub mod row;

pub use branch::{Branch, BranchId};
pub use commit::{Commit, CommitDetails, CommitId};
pub use edge::{Edge, EdgeId, EdgeKind};
pub use graph::{Graph, GraphStats};
pub use node::{Node, NodeId, NodeKind};
pub use row::{NodeRow, RowIdx};
