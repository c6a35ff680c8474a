//! Patent Dashboard Document Layer
//!
//! The capability interface every page component talks to:
//! - element lookup by id, class, tag and attribute
//! - class list, attribute and inline style mutation
//! - focus, scrolling and viewport intersection observation
//!
//! `MemoryDocument` is the in-memory implementation used by hosts and tests.
//! It is built from a `DocumentSpec` page description.

mod document;
mod error;
mod key;
mod memory;
mod spec;

pub use document::{Document, IntersectionEntry, NodeId, ObserveOptions, ScrollBehavior, Viewport};
pub use error::DomError;
pub use key::Key;
pub use memory::MemoryDocument;
pub use spec::{DocumentSpec, ElementSpec};

pub type Result<T> = std::result::Result<T, DomError>;

/// Class toggled on tabs, panels, buttons and the modal to mark them active.
pub const ACTIVE_CLASS: &str = "active";
