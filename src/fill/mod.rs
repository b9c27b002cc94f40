//! Verified form filling
//!
//! Field descriptors carry a value and ranked candidate selectors. The engine writes
//! each field, reads it back, and climbs a strategy ladder when a framework swallows
//! the write. The selector that finally worked is reported per field so it can be
//! saved for the next visit.

pub mod engine;
pub mod fields;

pub use engine::{FIELD_OP_SCRIPT, FillEngine, FillReport, WriteStrategy, values_match};
pub use fields::{FieldDescriptor, country_name, payment_fields, shipping_fields};
