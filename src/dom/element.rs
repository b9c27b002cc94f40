use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A DOM element as reported by the agent trace or a page scan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "button", "a", "input")
    #[serde(alias = "node_name")]
    pub tag_name: String,

    /// Element attributes (e.g., id, class, name, aria-label)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Accessible name / visible text of the element
    #[serde(default, alias = "ax_name", skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: add one attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Get a non-empty attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Get element ID
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Lower-cased tag name
    pub fn tag(&self) -> String {
        self.tag_name.to_ascii_lowercase()
    }

    /// First class that looks hand-written rather than generated (longer than 3 chars, no leading `_`)
    pub fn first_specific_class(&self) -> Option<&str> {
        self.get_attribute("class")?
            .split_whitespace()
            .find(|c| c.len() > 3 && !c.starts_with('_'))
    }

    /// Accessible text, empty when the element has none
    pub fn text(&self) -> &str {
        self.text_content.as_deref().unwrap_or("")
    }
}
