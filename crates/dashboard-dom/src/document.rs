//! Document capability interface
//!
//! Components never hold element references of their own; they hold `NodeId`
//! handles issued by a `Document` and go back through it for every read and
//! mutation.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::ACTIVE_CLASS;

/// Handle to an element inside one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Options passed along with an intersection observation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserveOptions {
    /// Visible fraction at which the host reports an intersection
    pub threshold: f32,
    /// CSS margin applied to the root viewport
    pub root_margin: String,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

/// One report delivered by the host for an observed element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

pub trait Document {
    fn head(&self) -> NodeId;
    fn body(&self) -> NodeId;

    /// First attached element whose `id` attribute matches
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// Attached elements carrying `class`, in document order
    fn elements_by_class(&self, class: &str) -> Vec<NodeId>;
    /// Attached elements with the given tag name, in document order
    fn elements_by_tag(&self, tag: &str) -> Vec<NodeId>;
    /// First attached element whose attribute `name` equals `value`
    fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId>;
    fn descendants_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId>;
    fn descendants_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    /// Set an inline style property; an empty value clears it
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    fn text_content(&self, node: NodeId) -> String;
    fn set_text_content(&mut self, node: NodeId, text: &str);
    fn inner_html(&self, node: NodeId) -> String;
    fn set_inner_html(&mut self, node: NodeId, html: &str);

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()>;

    fn focus(&mut self, node: NodeId);
    fn focused(&self) -> Option<NodeId>;
    fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior);

    /// Toggle the `active` class
    fn set_active(&mut self, node: NodeId, active: bool) {
        if active {
            self.add_class(node, ACTIVE_CLASS);
        } else {
            self.remove_class(node, ACTIVE_CLASS);
        }
    }

    fn is_active(&self, node: NodeId) -> bool {
        self.has_class(node, ACTIVE_CLASS)
    }

    fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.elements_by_class(class).into_iter().next()
    }
}

/// Viewport facts and intersection observation
pub trait Viewport {
    fn width(&self) -> u32;
    fn observe(&mut self, node: NodeId, options: ObserveOptions);
    fn unobserve(&mut self, node: NodeId);
}
