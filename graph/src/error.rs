use crate::core::{CommitId, NodeId};
use crate::model::ListenerId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cannot build a graph from an empty commit list")]
    EmptyInput,

    #[error("commit {0} lists itself as a parent")]
    SelfParent(CommitId),

    #[error("commit {id} appears twice in the log (positions {first} and {second})")]
    DuplicateCommit {
        id: CommitId,
        first: usize,
        second: usize,
    },

    #[error("commit {id} lists parent {parent} more than once")]
    DuplicateParent { id: CommitId, parent: CommitId },

    #[error("commit {0} is not part of the graph")]
    UnknownCommit(CommitId),

    #[error("fragment {0} is already collapsed")]
    AlreadyCollapsed(NodeId),

    #[error("fragment {0} is not collapsed")]
    NotCollapsed(NodeId),

    #[error("fragment {0} no longer matches the visible graph")]
    StaleFragment(NodeId),

    #[error("update listener {id} failed: {cause:#}")]
    Listener { id: ListenerId, cause: anyhow::Error },
}
