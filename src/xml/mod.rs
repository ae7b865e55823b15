//! Minimal owned XML tree over quick-xml: parse, serialize, reformat.

pub mod parse;
pub mod reformat;
pub mod tree;
pub mod write;

pub use parse::parse_document;
pub use reformat::{reformat, ReformatOptions};
pub use tree::{Document, Element, Node};
pub use write::write_document;
