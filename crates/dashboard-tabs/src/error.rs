//! Tab error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Tab not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Stale transition task #{got} (current #{current})")]
    StaleTask { got: u64, current: u64 },

    #[error("Document error: {0}")]
    Dom(#[from] dashboard_dom::DomError),
}

/// Tab/panel declarations that cannot be wired up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no tabs declared")]
    NoTabs,

    #[error("tab {tab} targets missing panel {target}")]
    MissingPanel { tab: String, target: String },

    #[error("more than one tab targets panel {0}")]
    DuplicateTarget(String),

    #[error("panel id {0} declared more than once")]
    DuplicatePanel(String),
}
