//! In-memory document
//!
//! Arena-backed element tree. Nodes are never freed; detached nodes simply
//! stop showing up in queries.

use std::collections::{BTreeMap, HashMap};

use crate::document::{Document, NodeId, ObserveOptions, ScrollBehavior, Viewport};
use crate::error::DomError;
use crate::spec::{DocumentSpec, ElementSpec, DEFAULT_VIEWPORT_WIDTH};
use crate::Result;

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    /// Raw markup assigned through `set_inner_html`; not parsed
    html: Option<String>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            style: BTreeMap::new(),
            text: String::new(),
            html: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Element>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    observed: HashMap<NodeId, ObserveOptions>,
    scrolls: Vec<(NodeId, ScrollBehavior)>,
    viewport_width: u32,
}

impl MemoryDocument {
    /// Empty `<html><head/><body/></html>` document
    pub fn new() -> Self {
        let mut root = Element::new("html");
        let mut head = Element::new("head");
        let mut body = Element::new("body");
        head.parent = Some(NodeId(0));
        body.parent = Some(NodeId(0));
        root.children = vec![NodeId(1), NodeId(2)];

        Self {
            nodes: vec![root, head, body],
            root: NodeId(0),
            head: NodeId(1),
            body: NodeId(2),
            focused: None,
            observed: HashMap::new(),
            scrolls: Vec::new(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
        }
    }

    pub fn from_spec(spec: &DocumentSpec) -> Self {
        let mut doc = Self::new();
        doc.viewport_width = spec.viewport_width;

        let head = doc.head;
        let body = doc.body;
        for element in &spec.head {
            doc.build(head, element);
        }
        for element in &spec.body {
            doc.build(body, element);
        }

        doc
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_spec(&DocumentSpec::from_json(json)?))
    }

    fn build(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let node = self.create_element(&spec.tag);
        {
            let element = &mut self.nodes[node.0];
            if let Some(id) = &spec.id {
                element.attributes.insert("id".to_string(), id.clone());
            }
            for (name, value) in &spec.attributes {
                element.attributes.insert(name.clone(), value.clone());
            }
            for class in &spec.classes {
                if !element.classes.contains(class) {
                    element.classes.push(class.clone());
                }
            }
            for (property, value) in &spec.style {
                element.style.insert(property.clone(), value.clone());
            }
            element.text = spec.text.clone();
        }
        self.attach(parent, node, None);

        for child in &spec.children {
            self.build(node, child);
        }

        node
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Class list of a node, in insertion order
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.get(node).map(|e| e.classes.clone()).unwrap_or_default()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node).map(|e| e.children.clone()).unwrap_or_default()
    }

    /// Options an element is currently observed with
    pub fn observation(&self, node: NodeId) -> Option<&ObserveOptions> {
        self.observed.get(&node)
    }

    /// Every `scroll_into_view` request, oldest first
    pub fn scroll_log(&self) -> &[(NodeId, ScrollBehavior)] {
        &self.scrolls
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        let element = self.nodes.get_mut(node.0);
        if element.is_none() {
            tracing::debug!(node = %node, "Mutation on unknown node ignored");
        }
        element
    }

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.get(n).and_then(|e| e.parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.get(node).and_then(|e| e.parent) {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
        self.nodes[node.0].parent = None;
    }

    fn attach(&mut self, parent: NodeId, node: NodeId, before: Option<usize>) {
        self.nodes[node.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        match before {
            Some(index) if index <= children.len() => children.insert(index, node),
            _ => children.push(node),
        }
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.contains(parent) {
            return Err(DomError::NodeNotFound(parent.to_string()));
        }
        if !self.contains(child) {
            return Err(DomError::NodeNotFound(child.to_string()));
        }
        if self.is_ancestor(child, parent) {
            return Err(DomError::InvalidHierarchy(format!(
                "{} cannot be inserted into its own subtree",
                child
            )));
        }
        Ok(())
    }

    /// Pre-order walk below `root`, excluding `root` itself
    fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(root) {
            Some(e) => e.children.iter().rev().copied().collect(),
            None => return out,
        };

        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(e) = self.get(node) {
                stack.extend(e.children.iter().rev().copied());
            }
        }

        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(e) = self.get(node) {
            out.push_str(&e.text);
            for child in &e.children {
                self.collect_text(*child, out);
            }
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for MemoryDocument {
    fn head(&self) -> NodeId {
        self.head
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attribute("id", id)
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants_by_class(self.root, class)
    }

    fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants_by_tag(self.root, tag)
    }

    fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.walk(self.root).into_iter().find(|n| {
            self.nodes[n.0]
                .attributes
                .get(name)
                .is_some_and(|v| v == value)
        })
    }

    fn descendants_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.walk(root)
            .into_iter()
            .filter(|n| self.nodes[n.0].classes.iter().any(|c| c == class))
            .collect()
    }

    fn descendants_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_lowercase();
        self.walk(root)
            .into_iter()
            .filter(|n| self.nodes[n.0].tag == tag)
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|e| e.parent)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|e| e.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.get(node)?;
        if name == "class" {
            return Some(element.classes.join(" "));
        }
        element.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.get_mut(node) {
            if name == "class" {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                element.attributes.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.get_mut(node) {
            if name == "class" {
                element.classes.clear();
            } else {
                element.attributes.remove(name);
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.get_mut(node) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.get_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.get(node).and_then(|e| e.style.get(property).cloned())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.get_mut(node) {
            if value.is_empty() {
                element.style.remove(property);
            } else {
                element.style.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if !self.contains(node) {
            return;
        }
        for child in self.children(node) {
            self.detach(child);
        }
        let element = &mut self.nodes[node.0];
        element.text = text.to_string();
        element.html = None;
    }

    fn inner_html(&self, node: NodeId) -> String {
        match self.get(node) {
            Some(e) => e.html.clone().unwrap_or_else(|| self.text_content(node)),
            None => String::new(),
        }
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        if !self.contains(node) {
            return;
        }
        for child in self.children(node) {
            self.detach(child);
        }
        let element = &mut self.nodes[node.0];
        element.text.clear();
        element.html = Some(html.to_string());
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertion(parent, child)?;
        self.detach(child);
        self.attach(parent, child, None);
        Ok(())
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        self.check_insertion(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::InvalidHierarchy(format!(
                "{} is not a child of {}",
                reference, parent
            )));
        }
        if child == reference {
            return Ok(());
        }

        self.detach(child);
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == reference);
        self.attach(parent, child, index);
        Ok(())
    }

    fn focus(&mut self, node: NodeId) {
        if self.contains(node) {
            self.focused = Some(node);
        }
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior) {
        if self.contains(node) {
            self.scrolls.push((node, behavior));
        }
    }
}

impl Viewport for MemoryDocument {
    fn width(&self) -> u32 {
        self.viewport_width
    }

    fn observe(&mut self, node: NodeId, options: ObserveOptions) {
        self.observed.insert(node, options);
    }

    fn unobserve(&mut self, node: NodeId) {
        self.observed.remove(&node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MemoryDocument {
        let spec = DocumentSpec::from_value(json!({
            "viewport_width": 1024,
            "body": [
                { "tag": "nav", "classes": ["nav-wrapper"], "children": [
                    { "tag": "button", "classes": ["nav-tab", "active"],
                      "attributes": { "data-tab": "overview" }, "text": "Overview" },
                    { "tag": "button", "classes": ["nav-tab"],
                      "attributes": { "data-tab": "process" }, "text": "Process" }
                ]},
                { "id": "overview", "classes": ["tab-content", "active"], "children": [
                    { "tag": "h2", "text": "Patent " },
                    { "tag": "p", "text": "overview" }
                ]},
                { "id": "process", "classes": ["tab-content"] }
            ]
        }))
        .unwrap();
        MemoryDocument::from_spec(&spec)
    }

    #[test]
    fn test_queries_follow_document_order() {
        let doc = sample();
        let tabs = doc.elements_by_class("nav-tab");
        assert_eq!(tabs.len(), 2);
        assert_eq!(doc.attribute(tabs[0], "data-tab").as_deref(), Some("overview"));
        assert_eq!(doc.attribute(tabs[1], "data-tab").as_deref(), Some("process"));

        let panel = doc.element_by_id("process").unwrap();
        assert_eq!(doc.elements_by_class("tab-content")[1], panel);
        assert_eq!(doc.find_by_attribute("data-tab", "process"), Some(tabs[1]));
        assert_eq!(doc.elements_by_tag("BUTTON").len(), 2);
        assert_eq!(doc.width(), 1024);
    }

    #[test]
    fn test_class_and_style_mutation() {
        let mut doc = sample();
        let panel = doc.element_by_id("process").unwrap();

        doc.set_active(panel, true);
        assert!(doc.is_active(panel));
        doc.add_class(panel, "active");
        assert_eq!(doc.classes(panel), vec!["tab-content", "active"]);
        doc.set_active(panel, false);
        assert!(!doc.is_active(panel));

        doc.set_style(panel, "opacity", "0");
        assert_eq!(doc.style(panel, "opacity").as_deref(), Some("0"));
        doc.set_style(panel, "opacity", "");
        assert!(doc.style(panel, "opacity").is_none());

        doc.set_attribute(panel, "class", "tab-content hidden");
        assert!(doc.has_class(panel, "hidden"));
        assert_eq!(doc.attribute(panel, "class").as_deref(), Some("tab-content hidden"));
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut doc = sample();
        let panel = doc.element_by_id("overview").unwrap();
        assert_eq!(doc.text_content(panel), "Patent overview");

        doc.set_text_content(panel, "replaced");
        assert_eq!(doc.text_content(panel), "replaced");
        assert!(doc.children(panel).is_empty());
        assert!(doc.elements_by_tag("h2").is_empty());
    }

    #[test]
    fn test_inner_html_replaces_children() {
        let mut doc = sample();
        let panel = doc.element_by_id("overview").unwrap();
        doc.set_inner_html(panel, "<p>hello</p>");
        assert_eq!(doc.inner_html(panel), "<p>hello</p>");
        assert!(doc.elements_by_tag("p").is_empty());
    }

    #[test]
    fn test_detached_elements_are_not_queried() {
        let mut doc = sample();
        let div = doc.create_element("div");
        doc.set_attribute(div, "id", "floating");
        assert!(doc.element_by_id("floating").is_none());

        let body = doc.body();
        doc.append_child(body, div).unwrap();
        assert_eq!(doc.element_by_id("floating"), Some(div));
        assert_eq!(doc.parent(div), Some(body));
    }

    #[test]
    fn test_insert_before() {
        let mut doc = sample();
        let nav = doc.first_by_class("nav-wrapper").unwrap();
        let body = doc.body();
        let sentinel = doc.create_element("div");

        doc.insert_before(body, sentinel, nav).unwrap();
        assert_eq!(doc.children(body)[0], sentinel);
        assert_eq!(doc.children(body)[1], nav);

        let tab = doc.elements_by_class("nav-tab")[0];
        assert!(doc.insert_before(body, sentinel, tab).is_err());
    }

    #[test]
    fn test_cannot_insert_into_own_subtree() {
        let mut doc = sample();
        let nav = doc.first_by_class("nav-wrapper").unwrap();
        let tab = doc.elements_by_class("nav-tab")[0];
        assert!(doc.append_child(tab, nav).is_err());
    }

    #[test]
    fn test_focus_scroll_and_observe() {
        let mut doc = sample();
        let panel = doc.element_by_id("process").unwrap();

        assert!(doc.focused().is_none());
        doc.focus(panel);
        assert_eq!(doc.focused(), Some(panel));

        doc.scroll_into_view(panel, ScrollBehavior::Smooth);
        assert_eq!(doc.scroll_log(), &[(panel, ScrollBehavior::Smooth)]);

        doc.observe(panel, ObserveOptions::default());
        assert!(doc.observation(panel).is_some());
        doc.unobserve(panel);
        assert!(doc.observation(panel).is_none());
    }
}
