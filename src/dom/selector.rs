//! CSS selector derivation
//!
//! Two priority orders are used. Navigation clicks prefer identifiers that survive
//! re-renders of buttons and links; form fields prefer the `autocomplete` token, which
//! checkout platforms keep stable across themes.

use crate::dom::element::ElementNode;

/// Attributes checkout themes use for test hooks, in preference order
const TEST_ID_ATTRIBUTES: [&str; 3] = ["data-testid", "data-test", "data-cy"];

/// Most stable selector for a clicked element.
///
/// Priority: `#id`, `tag[name="…"]`, test-id family, `[aria-label="…"]`, `tag.class`.
pub fn navigation_selector(element: &ElementNode) -> Option<String> {
    let tag = element.tag();

    if let Some(id) = element.id() {
        return Some(format!("#{}", escape_identifier(id)));
    }

    if let Some(name) = element.get_attribute("name") {
        if !tag.is_empty() {
            return Some(format!("{}[name=\"{}\"]", tag, escape_attribute(name)));
        }
    }

    for attr in TEST_ID_ATTRIBUTES {
        if let Some(value) = element.get_attribute(attr) {
            return Some(format!("[{}=\"{}\"]", attr, escape_attribute(value)));
        }
    }

    if let Some(label) = element.get_attribute("aria-label") {
        return Some(format!("[aria-label=\"{}\"]", escape_attribute(label)));
    }

    if tag.is_empty() {
        return None;
    }
    element.first_specific_class().map(|class| format!("{}.{}", tag, escape_identifier(class)))
}

/// Selector for a form field found by a page scan.
///
/// Priority: `[autocomplete="…"]`, `#id`, `tag[name="…"]`, `tag[type="…"][placeholder="…"]`.
pub fn field_selector(element: &ElementNode) -> Option<String> {
    if let Some(auto) = element.get_attribute("autocomplete") {
        return Some(format!("[autocomplete=\"{}\"]", escape_attribute(auto)));
    }

    if let Some(id) = element.id() {
        return Some(format!("#{}", escape_identifier(id)));
    }

    let tag = element.tag();
    if let Some(name) = element.get_attribute("name") {
        return Some(format!("{}[name=\"{}\"]", tag, escape_attribute(name)));
    }

    match (element.get_attribute("type"), element.get_attribute("placeholder")) {
        (Some(kind), Some(placeholder)) => Some(format!(
            "{}[type=\"{}\"][placeholder=\"{}\"]",
            tag,
            escape_attribute(kind),
            escape_attribute(placeholder)
        )),
        _ => None,
    }
}

/// Escape a value for use inside a double-quoted attribute selector
pub fn escape_attribute(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape an identifier (id or class) the way `CSS.escape` does for common input
pub fn escape_identifier(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (i, c) in ident.chars().enumerate() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            if i == 0 && c.is_ascii_digit() {
                out.push_str(&format!("\\{:x} ", c as u32));
            } else {
                out.push(c);
            }
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_wins() {
        let el = ElementNode::new("button")
            .with_attribute("id", "checkout")
            .with_attribute("name", "go")
            .with_attribute("aria-label", "Checkout");
        assert_eq!(navigation_selector(&el).as_deref(), Some("#checkout"));
    }

    #[test]
    fn test_name_before_test_ids() {
        let el = ElementNode::new("BUTTON")
            .with_attribute("name", "add")
            .with_attribute("data-testid", "add-btn");
        assert_eq!(navigation_selector(&el).as_deref(), Some("button[name=\"add\"]"));
    }

    #[test]
    fn test_test_id_family_order() {
        let el = ElementNode::new("a")
            .with_attribute("data-cy", "cy-link")
            .with_attribute("data-test", "test-link");
        assert_eq!(navigation_selector(&el).as_deref(), Some("[data-test=\"test-link\"]"));
    }

    #[test]
    fn test_aria_label_then_class() {
        let labelled = ElementNode::new("button").with_attribute("aria-label", "Close \"dialog\"");
        assert_eq!(navigation_selector(&labelled).as_deref(), Some("[aria-label=\"Close \\\"dialog\\\"\"]"));

        let classed = ElementNode::new("button").with_attribute("class", "btn _hash cart-button");
        assert_eq!(navigation_selector(&classed).as_deref(), Some("button.cart-button"));
    }

    #[test]
    fn test_no_selector() {
        let bare = ElementNode::new("div").with_attribute("class", "a b");
        assert_eq!(navigation_selector(&bare), None);
    }

    #[test]
    fn test_field_selector_priority() {
        let auto = ElementNode::new("input").with_attribute("autocomplete", "email").with_attribute("id", "e");
        assert_eq!(field_selector(&auto).as_deref(), Some("[autocomplete=\"email\"]"));

        let id = ElementNode::new("input").with_attribute("id", "checkout:zip");
        assert_eq!(field_selector(&id).as_deref(), Some("#checkout\\:zip"));

        let named = ElementNode::new("SELECT").with_attribute("name", "country");
        assert_eq!(field_selector(&named).as_deref(), Some("select[name=\"country\"]"));

        let placeholder = ElementNode::new("input")
            .with_attribute("type", "text")
            .with_attribute("placeholder", "MM / YY");
        assert_eq!(
            field_selector(&placeholder).as_deref(),
            Some("input[type=\"text\"][placeholder=\"MM / YY\"]")
        );

        assert_eq!(field_selector(&ElementNode::new("input").with_attribute("type", "text")), None);
    }

    #[test]
    fn test_escape_identifier_leading_digit() {
        assert_eq!(escape_identifier("1st"), "\\31 st");
        assert_eq!(escape_identifier("plain-id_2"), "plain-id_2");
    }
}
