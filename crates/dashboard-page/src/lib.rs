//! Patent Dashboard Page Behaviour
//!
//! Everything on the page besides tab navigation: stage filtering of process
//! cards, the detail modal, scroll reveal and hover effects, in-page anchors,
//! responsive tweaks and scroll/resize coalescing.
//!
//! Components are installed against a document once and then fed events and
//! their own deferred tasks by the owner.

mod animations;
mod error;
mod filter;
mod modal;
mod perf;
mod responsive;

pub use animations::{Anchors, HoverLift, ScrollReveal, HOVER_CLASSES, REVEAL_CLASSES};
pub use error::PageError;
pub use filter::{FilterTask, FilterTimings, ProcessFilter, ALL_STAGES};
pub use modal::{Modal, ModalContent};
pub use perf::{PerfTask, Performance};
pub use responsive::{Responsive, ResponsiveSettings, ResponsiveTask};

use dashboard_dom::{Document, NodeId};

pub type Result<T> = std::result::Result<T, PageError>;

/// Elements carrying any of `classes`, each listed once, in creation order
pub(crate) fn elements_with_any_class<D: Document + ?Sized>(
    doc: &D,
    classes: &[&str],
) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = classes
        .iter()
        .flat_map(|class| doc.elements_by_class(class))
        .collect();
    nodes.sort();
    nodes.dedup();
    nodes
}

/// `node` or its nearest ancestor carrying `class`
pub(crate) fn closest_with_class<D: Document + ?Sized>(
    doc: &D,
    node: NodeId,
    class: &str,
) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if doc.has_class(n, class) {
            return Some(n);
        }
        current = doc.parent(n);
    }
    None
}

/// Whether `node` is `ancestor` or lies inside it
pub(crate) fn is_within<D: Document + ?Sized>(doc: &D, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n == ancestor {
            return true;
        }
        current = doc.parent(n);
    }
    false
}

/// CSS seconds value, e.g. `300` -> `"0.3s"`
pub(crate) fn css_seconds(millis: u64) -> String {
    format!("{}s", millis as f64 / 1000.0)
}
