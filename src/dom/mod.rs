//! DOM element model and selector derivation
//!
//! - ElementNode: an element as reported by the agent trace or a page scan
//! - selector: stable CSS selectors for navigation clicks and form fields

pub mod element;
pub mod selector;

pub use element::ElementNode;
pub use selector::{field_selector, navigation_selector};
