//! Sticky navigation header
//!
//! A zero-height sentinel sits just above the nav wrapper. When the host
//! reports it has scrolled out of view the wrapper gets the `sticky` class.

use dashboard_dom::{Document, IntersectionEntry, NodeId, ObserveOptions, Viewport};

use crate::{Result, NAV_WRAPPER_CLASS, STICKY_CLASS};

const SENTINEL_STYLES: [(&str, &str); 6] = [
    ("height", "1px"),
    ("position", "absolute"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("pointer-events", "none"),
];

#[derive(Debug, Clone)]
pub struct StickyHeader {
    wrapper: NodeId,
    sentinel: NodeId,
    sticky: bool,
}

impl StickyHeader {
    /// Insert and observe the sentinel. `None` if the page has no nav wrapper.
    pub fn install<D: Document + Viewport + ?Sized>(doc: &mut D) -> Result<Option<Self>> {
        let Some(wrapper) = doc.first_by_class(NAV_WRAPPER_CLASS) else {
            tracing::debug!("No nav wrapper, sticky header disabled");
            return Ok(None);
        };
        let Some(parent) = doc.parent(wrapper) else {
            tracing::debug!("Nav wrapper is detached, sticky header disabled");
            return Ok(None);
        };

        let sentinel = doc.create_element("div");
        doc.set_attribute(sentinel, "id", &format!("nav-sentinel-{}", uuid::Uuid::new_v4()));
        doc.set_attribute(sentinel, "aria-hidden", "true");
        for (property, value) in SENTINEL_STYLES {
            doc.set_style(sentinel, property, value);
        }
        doc.insert_before(parent, sentinel, wrapper)?;
        doc.observe(sentinel, ObserveOptions::default());

        tracing::debug!(sentinel = %sentinel, "Sticky header installed");

        Ok(Some(Self {
            wrapper,
            sentinel,
            sticky: doc.has_class(wrapper, STICKY_CLASS),
        }))
    }

    /// Apply an intersection report. Returns false for entries about other nodes.
    pub fn on_intersection<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        entry: &IntersectionEntry,
    ) -> bool {
        if entry.target != self.sentinel {
            return false;
        }

        let sticky = !entry.is_intersecting;
        if sticky {
            doc.add_class(self.wrapper, STICKY_CLASS);
        } else {
            doc.remove_class(self.wrapper, STICKY_CLASS);
        }

        if sticky != self.sticky {
            tracing::trace!(sticky, "Nav wrapper stickiness changed");
        }
        self.sticky = sticky;
        true
    }

    pub fn sentinel(&self) -> NodeId {
        self.sentinel
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_dom::{DocumentSpec, MemoryDocument};
    use serde_json::json;

    fn page() -> MemoryDocument {
        let spec = DocumentSpec::from_value(json!({
            "body": [
                { "tag": "header", "text": "Patent" },
                { "tag": "nav", "classes": ["nav-wrapper"] }
            ]
        }))
        .unwrap();
        MemoryDocument::from_spec(&spec)
    }

    #[test]
    fn test_install_places_sentinel_before_wrapper() {
        let mut doc = page();
        let sticky = StickyHeader::install(&mut doc).unwrap().unwrap();

        let children = doc.children(doc.body());
        let position = children.iter().position(|n| *n == sticky.sentinel()).unwrap();
        assert_eq!(children[position + 1], sticky.wrapper());

        let sentinel = sticky.sentinel();
        assert_eq!(doc.style(sentinel, "height").as_deref(), Some("1px"));
        assert_eq!(doc.style(sentinel, "pointer-events").as_deref(), Some("none"));
        assert!(doc
            .attribute(sentinel, "id")
            .unwrap()
            .starts_with("nav-sentinel-"));
        assert!(doc.observation(sentinel).is_some());
        assert!(!sticky.is_sticky());
    }

    #[test]
    fn test_toggles_sticky_class() {
        let mut doc = page();
        let mut sticky = StickyHeader::install(&mut doc).unwrap().unwrap();
        let wrapper = sticky.wrapper();

        let left = IntersectionEntry {
            target: sticky.sentinel(),
            is_intersecting: false,
        };
        assert!(sticky.on_intersection(&mut doc, &left));
        assert!(doc.has_class(wrapper, STICKY_CLASS));
        assert!(sticky.is_sticky());

        let back = IntersectionEntry {
            target: sticky.sentinel(),
            is_intersecting: true,
        };
        assert!(sticky.on_intersection(&mut doc, &back));
        assert!(!doc.has_class(wrapper, STICKY_CLASS));

        let other = IntersectionEntry {
            target: wrapper,
            is_intersecting: false,
        };
        assert!(!sticky.on_intersection(&mut doc, &other));
        assert!(!doc.has_class(wrapper, STICKY_CLASS));
    }

    #[test]
    fn test_missing_wrapper_disables_sticky() {
        let mut doc = MemoryDocument::new();
        assert!(StickyHeader::install(&mut doc).unwrap().is_none());
    }
}
