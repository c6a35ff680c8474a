//! Scroll reveal, hover lift and in-page anchor scrolling

use dashboard_dom::{Document, IntersectionEntry, NodeId, ObserveOptions, ScrollBehavior, Viewport};
use url::Url;

use crate::{elements_with_any_class, Result};

/// Cards that start hidden and fade in when scrolled into view
pub const REVEAL_CLASSES: [&str; 4] = ["process-card", "matrix-card", "stat-card", "detail-card"];

/// Elements that lift while hovered
pub const HOVER_CLASSES: [&str; 4] = ["process-card", "matrix-card", "tech-item", "flow-step"];

const REVEAL_TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

#[derive(Debug, Clone, Default)]
pub struct ScrollReveal {
    targets: Vec<NodeId>,
}

impl ScrollReveal {
    /// Hide every reveal target and start observing it
    pub fn install<D: Document + Viewport + ?Sized>(doc: &mut D, options: &ObserveOptions) -> Self {
        let targets = elements_with_any_class(doc, &REVEAL_CLASSES);
        for card in &targets {
            doc.set_style(*card, "opacity", "0");
            doc.set_style(*card, "transform", "translateY(20px)");
            doc.set_style(*card, "transition", REVEAL_TRANSITION);
            doc.observe(*card, options.clone());
        }

        tracing::debug!(targets = targets.len(), "Scroll reveal installed");
        Self { targets }
    }

    /// Reveal on entry. Returns false for nodes this component does not observe.
    pub fn on_intersection<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        entry: &IntersectionEntry,
    ) -> bool {
        if !self.targets.contains(&entry.target) {
            return false;
        }
        if entry.is_intersecting {
            doc.set_style(entry.target, "opacity", "1");
            doc.set_style(entry.target, "transform", "translateY(0)");
        }
        true
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }
}

#[derive(Debug, Clone, Default)]
pub struct HoverLift {
    targets: Vec<NodeId>,
}

impl HoverLift {
    pub fn install<D: Document + ?Sized>(doc: &D) -> Self {
        Self {
            targets: elements_with_any_class(doc, &HOVER_CLASSES),
        }
    }

    pub fn on_enter<D: Document + ?Sized>(&self, doc: &mut D, node: NodeId) -> bool {
        self.lift(doc, node, "translateY(-5px)")
    }

    pub fn on_leave<D: Document + ?Sized>(&self, doc: &mut D, node: NodeId) -> bool {
        self.lift(doc, node, "translateY(0)")
    }

    fn lift<D: Document + ?Sized>(&self, doc: &mut D, node: NodeId, transform: &str) -> bool {
        if !self.targets.contains(&node) {
            return false;
        }
        doc.set_style(node, "transform", transform);
        true
    }
}

/// Smooth scrolling for `<a href="#...">` links
#[derive(Debug, Clone)]
pub struct Anchors {
    base: Url,
}

impl Anchors {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(base: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(base)?))
    }

    /// Route a click. Returns true when it hit an in-page anchor, whether or
    /// not the fragment resolves.
    pub fn handle_click<D: Document + ?Sized>(&self, doc: &mut D, node: NodeId) -> bool {
        let Some((anchor, href)) = self.enclosing_anchor(doc, node) else {
            return false;
        };

        match self.resolve(doc, &href) {
            Some(target) => {
                tracing::trace!(anchor = %anchor, href = %href, "Scrolling to anchor target");
                doc.scroll_into_view(target, ScrollBehavior::Smooth);
            }
            None => tracing::debug!(href = %href, "Anchor target not found"),
        }
        true
    }

    /// Element an in-page `href` points at
    pub fn resolve<D: Document + ?Sized>(&self, doc: &D, href: &str) -> Option<NodeId> {
        let resolved = match self.base.join(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(href, error = %e, "Unresolvable anchor");
                return None;
            }
        };
        let fragment = resolved.fragment().filter(|f| !f.is_empty())?;

        doc.element_by_id(fragment).or_else(|| {
            // `join` percent-encodes non-ASCII fragments
            let raw = href.strip_prefix('#')?;
            doc.element_by_id(raw)
        })
    }

    fn enclosing_anchor<D: Document + ?Sized>(
        &self,
        doc: &D,
        node: NodeId,
    ) -> Option<(NodeId, String)> {
        let mut current = Some(node);
        while let Some(n) = current {
            if doc.tag(n) == Some("a") {
                let href = doc.attribute(n, "href")?;
                return href.starts_with('#').then_some((n, href));
            }
            current = doc.parent(n);
        }
        None
    }
}
