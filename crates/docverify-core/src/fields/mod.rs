//! Structured field extraction from document text.

mod parser;

pub use parser::{FieldParser, parse_fields};
