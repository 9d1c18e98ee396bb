//! Plain-text table of contents: parsing lines and rebuilding the outline tree.
pub mod builder;
pub mod entry;
pub mod source;
pub mod tree;

pub use builder::build;
pub use source::{read_toc_file, DEFAULT_ENCODING};
pub use tree::{NodeId, OutlineItem, OutlineTree};
