pub mod document;
pub mod outline;

pub use document::PdfDocument;
