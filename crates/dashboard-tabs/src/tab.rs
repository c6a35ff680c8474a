//! Tab and panel records
//!
//! Declared once from the document. The controller only flips their `active`
//! flags and mirrors them onto the nodes.

use dashboard_dom::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    /// Unique identifier
    pub id: String,
    /// Text shown on the selector
    pub label: String,
    /// Id of the panel this tab shows
    pub target: String,
    /// Selector element
    pub node: NodeId,
    pub active: bool,
}

impl Tab {
    pub fn new(id: String, label: String, target: String, node: NodeId) -> Self {
        Self {
            id,
            label,
            target,
            node,
            active: false,
        }
    }

    /// Builder-style flag used when the markup already marks the tab active
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Get display label (with fallback to the panel id)
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.target
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub node: NodeId,
    pub active: bool,
}

impl Panel {
    pub fn new(id: String, node: NodeId) -> Self {
        Self {
            id,
            node,
            active: false,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}
