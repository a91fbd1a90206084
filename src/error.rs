//! Error types raised by graph mutation and hierarchy operations.

use thiserror::Error;

/// A refused operation. The state that produced it is left untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A node or edge id is already taken.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A node names a parent that does not exist.
    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: String, parent: String },

    /// An edge names an endpoint that does not exist.
    #[error("edge {edge} references missing endpoint {endpoint}")]
    DanglingEndpoint { edge: String, endpoint: String },

    /// No node or edge with this id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The parent chain starting at this node loops back on itself.
    #[error("parent cycle through node {0}")]
    Cycle(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
