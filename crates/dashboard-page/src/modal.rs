//! Detail modal
//!
//! Clicking a process or matrix card opens `#modal` with a body generated
//! from the card's text. Card text is escaped before it is placed in markup.

use dashboard_dom::{Document, Key, NodeId};

use crate::error::PageError;
use crate::{closest_with_class, is_within, Result};

const MODAL_ID: &str = "modal";
const TITLE_ID: &str = "modal-title";
const BODY_ID: &str = "modal-body";
const CLOSE_ID: &str = "modal-close";

const PROCESS_CARD_CLASS: &str = "process-card";
const MATRIX_CARD_CLASS: &str = "matrix-card";

const PROCESS_CLOSING: &str = "This process utilizes advanced AI algorithms and real-time data \
processing to ensure optimal performance and accuracy. The system is designed for scalability and \
can handle high-volume data streams while maintaining low latency.";

const MATRIX_CLOSING: &str = "This feature provides significant value through automation, improved \
accuracy, and enhanced user experience. It integrates seamlessly with other platform components to \
deliver comprehensive solutions.";

/// Text pulled from a card plus the generated body markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContent {
    pub title: String,
    pub html: String,
}

impl ModalContent {
    /// Content for a `.process-card`
    pub fn from_process_card<D: Document + ?Sized>(doc: &D, card: NodeId) -> Result<Self> {
        let title = required_text(doc, card, "process-title")?;
        let description = required_text(doc, card, "process-description")?;
        let features = list_items(doc, card, "process-features");

        Ok(Self {
            title,
            html: render_sections(&[
                ("Description", Section::Paragraph(&description)),
                ("Key Features", Section::List(&features)),
                ("Technical Implementation", Section::Paragraph(PROCESS_CLOSING)),
            ]),
        })
    }

    /// Content for a `.matrix-card`
    pub fn from_matrix_card<D: Document + ?Sized>(doc: &D, card: NodeId) -> Result<Self> {
        let title = required_text(doc, card, "matrix-title")?;
        let content = required_text(doc, card, "matrix-content")?;
        let features = list_items(doc, card, "matrix-list");

        Ok(Self {
            title,
            html: render_sections(&[
                ("Overview", Section::Paragraph(&content)),
                ("Capabilities", Section::List(&features)),
                ("Benefits", Section::Paragraph(MATRIX_CLOSING)),
            ]),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Modal {
    modal: NodeId,
    title: NodeId,
    body: NodeId,
    close: Option<NodeId>,
}

impl Modal {
    /// `None` when the page has no `#modal`
    pub fn install<D: Document + ?Sized>(doc: &D) -> Result<Option<Self>> {
        let Some(modal) = doc.element_by_id(MODAL_ID) else {
            tracing::debug!("No modal element, card details disabled");
            return Ok(None);
        };

        let title = doc
            .element_by_id(TITLE_ID)
            .ok_or_else(|| PageError::MissingElement(format!("#{}", TITLE_ID)))?;
        let body = doc
            .element_by_id(BODY_ID)
            .ok_or_else(|| PageError::MissingElement(format!("#{}", BODY_ID)))?;

        Ok(Some(Self {
            modal,
            title,
            body,
            close: doc.element_by_id(CLOSE_ID),
        }))
    }

    pub fn is_open<D: Document + ?Sized>(&self, doc: &D) -> bool {
        doc.is_active(self.modal)
    }

    pub fn open<D: Document + ?Sized>(&self, doc: &mut D, content: &ModalContent) {
        doc.set_text_content(self.title, &content.title);
        doc.set_inner_html(self.body, &content.html);
        doc.set_active(self.modal, true);
        let page = doc.body();
        doc.set_style(page, "overflow", "hidden");

        tracing::debug!(title = %content.title, "Modal opened");
    }

    pub fn close<D: Document + ?Sized>(&self, doc: &mut D) {
        doc.set_active(self.modal, false);
        let page = doc.body();
        doc.set_style(page, "overflow", "");
    }

    /// Route a click. Returns true when the modal handled it.
    pub fn handle_click<D: Document + ?Sized>(&self, doc: &mut D, node: NodeId) -> bool {
        if let Some(close) = self.close {
            if is_within(doc, node, close) {
                self.close(doc);
                return true;
            }
        }
        // Backdrop only; clicks on the dialog itself land on descendants
        if node == self.modal {
            self.close(doc);
            return true;
        }
        if is_within(doc, node, self.modal) {
            return false;
        }

        let content = if let Some(card) = closest_with_class(doc, node, PROCESS_CARD_CLASS) {
            ModalContent::from_process_card(doc, card)
        } else if let Some(card) = closest_with_class(doc, node, MATRIX_CARD_CLASS) {
            ModalContent::from_matrix_card(doc, card)
        } else {
            return false;
        };

        match content {
            Ok(content) => {
                self.open(doc, &content);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Card is missing modal content");
                false
            }
        }
    }

    /// Escape closes an open modal
    pub fn handle_key<D: Document + ?Sized>(&self, doc: &mut D, key: &Key) -> bool {
        if *key == Key::Escape && self.is_open(doc) {
            self.close(doc);
            return true;
        }
        false
    }
}

enum Section<'a> {
    Paragraph(&'a str),
    List(&'a [String]),
}

fn render_sections(sections: &[(&str, Section<'_>)]) -> String {
    let mut html = String::new();
    for (heading, section) in sections {
        html.push_str("<div class=\"modal-section\"><h3>");
        html.push_str(heading);
        html.push_str("</h3>");
        match section {
            Section::Paragraph(text) => {
                html.push_str("<p>");
                html.push_str(&escape_html(text));
                html.push_str("</p>");
            }
            Section::List(items) => {
                html.push_str("<ul class=\"modal-list\">");
                for item in items.iter() {
                    html.push_str("<li>");
                    html.push_str(&escape_html(item));
                    html.push_str("</li>");
                }
                html.push_str("</ul>");
            }
        }
        html.push_str("</div>");
    }
    html
}

fn required_text<D: Document + ?Sized>(doc: &D, card: NodeId, class: &str) -> Result<String> {
    doc.descendants_by_class(card, class)
        .first()
        .map(|n| doc.text_content(*n).trim().to_string())
        .ok_or_else(|| PageError::MissingElement(format!(".{}", class)))
}

/// Text of every `li` under the first `list_class` element
fn list_items<D: Document + ?Sized>(doc: &D, card: NodeId, list_class: &str) -> Vec<String> {
    doc.descendants_by_class(card, list_class)
        .first()
        .map(|list| {
            doc.descendants_by_tag(*list, "li")
                .into_iter()
                .map(|li| doc.text_content(li).trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_dom::{DocumentSpec, MemoryDocument};
    use serde_json::json;

    fn page() -> MemoryDocument {
        let spec = DocumentSpec::from_value(json!({
            "body": [
                { "classes": ["process-card"], "children": [
                    { "tag": "h3", "classes": ["process-title"], "text": "Signal Capture" },
                    { "tag": "p", "classes": ["process-description"],
                      "text": "Reads <raw> sensor data" },
                    { "tag": "ul", "classes": ["process-features"], "children": [
                        { "tag": "li", "text": "Low latency" },
                        { "tag": "li", "text": "R&D ready" }
                    ]}
                ]},
                { "classes": ["matrix-card"], "children": [
                    { "tag": "h4", "classes": ["matrix-title"], "text": "Scoring" },
                    { "tag": "p", "classes": ["matrix-content"], "text": "Ranks claims" }
                ]},
                { "classes": ["process-card"], "children": [
                    { "tag": "p", "text": "No title here" }
                ]},
                { "id": "modal", "children": [
                    { "classes": ["modal-content"], "children": [
                        { "tag": "button", "id": "modal-close",
                          "children": [ { "tag": "span", "text": "x" } ] },
                        { "tag": "h2", "id": "modal-title" },
                        { "id": "modal-body" }
                    ]}
                ]}
            ]
        }))
        .unwrap();
        MemoryDocument::from_spec(&spec)
    }

    #[test]
    fn test_process_card_opens_modal() {
        let mut doc = page();
        let modal = Modal::install(&doc).unwrap().unwrap();
        let title_node = doc.elements_by_tag("h3")[0];

        assert!(modal.handle_click(&mut doc, title_node));
        assert!(modal.is_open(&doc));

        let title = doc.element_by_id(TITLE_ID).unwrap();
        assert_eq!(doc.text_content(title), "Signal Capture");
        let body = doc.element_by_id(BODY_ID).unwrap();
        let html = doc.inner_html(body);
        assert!(html.contains("<h3>Description</h3><p>Reads &lt;raw&gt; sensor data</p>"));
        assert!(html.contains("<li>Low latency</li><li>R&amp;D ready</li>"));
        assert!(html.contains("Technical Implementation"));
        assert_eq!(doc.style(doc.body(), "overflow").as_deref(), Some("hidden"));
    }

    #[test]
    fn test_matrix_card_without_list() {
        let doc = page();
        let card = doc.elements_by_class(MATRIX_CARD_CLASS)[0];
        let content = ModalContent::from_matrix_card(&doc, card).unwrap();

        assert_eq!(content.title, "Scoring");
        assert!(content.html.contains("<h3>Overview</h3><p>Ranks claims</p>"));
        assert!(content.html.contains("<ul class=\"modal-list\"></ul>"));
        assert!(content.html.contains("Benefits"));
    }

    #[test]
    fn test_close_paths() {
        let mut doc = page();
        let modal = Modal::install(&doc).unwrap().unwrap();
        let card = doc.elements_by_class(PROCESS_CARD_CLASS)[0];
        let modal_node = doc.element_by_id(MODAL_ID).unwrap();
        let close_icon = doc.elements_by_tag("span")[0];

        modal.handle_click(&mut doc, card);
        assert!(modal.handle_click(&mut doc, close_icon));
        assert!(!modal.is_open(&doc));
        assert!(doc.style(doc.body(), "overflow").is_none());

        modal.handle_click(&mut doc, card);
        // Clicks inside the dialog keep it open
        let dialog = doc.first_by_class("modal-content").unwrap();
        assert!(!modal.handle_click(&mut doc, dialog));
        assert!(modal.is_open(&doc));
        assert!(modal.handle_click(&mut doc, modal_node));
        assert!(!modal.is_open(&doc));

        modal.handle_click(&mut doc, card);
        assert!(!modal.handle_key(&mut doc, &Key::Enter));
        assert!(modal.handle_key(&mut doc, &Key::Escape));
        assert!(!modal.is_open(&doc));
        assert!(!modal.handle_key(&mut doc, &Key::Escape));
    }

    #[test]
    fn test_card_missing_title_is_skipped() {
        let mut doc = page();
        let modal = Modal::install(&doc).unwrap().unwrap();
        let broken = doc.elements_by_class(PROCESS_CARD_CLASS)[1];

        assert!(!modal.handle_click(&mut doc, broken));
        assert!(!modal.is_open(&doc));
        assert!(matches!(
            ModalContent::from_process_card(&doc, broken),
            Err(PageError::MissingElement(ref s)) if s == ".process-title"
        ));
    }

    #[test]
    fn test_install_without_modal() {
        assert!(Modal::install(&MemoryDocument::new()).unwrap().is_none());
    }
}
