//! Document error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Invalid document description: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
