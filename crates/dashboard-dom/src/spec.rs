//! Static page description
//!
//! The page is declared once, as JSON, and loaded into a `MemoryDocument`:
//!
//! ```json
//! { "viewport_width": 1280,
//!   "body": [ { "tag": "button", "classes": ["nav-tab"],
//!               "attributes": { "data-tab": "overview" }, "text": "Overview" } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSpec {
    pub viewport_width: u32,
    pub head: Vec<ElementSpec>,
    pub body: Vec<ElementSpec>,
}

impl Default for DocumentSpec {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            head: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl DocumentSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<ElementSpec>,
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let spec = DocumentSpec::from_json(r#"{ "body": [ { "id": "modal" } ] }"#).unwrap();
        assert_eq!(spec.viewport_width, DEFAULT_VIEWPORT_WIDTH);
        assert_eq!(spec.body[0].tag, "div");
        assert_eq!(spec.body[0].id.as_deref(), Some("modal"));
        assert!(spec.head.is_empty());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(DocumentSpec::from_json("{ body: ").is_err());
    }
}
