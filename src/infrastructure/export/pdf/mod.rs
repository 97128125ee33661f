//! PDF output
//!
//! Cursor-based page layout in the manner of FPDF: Helvetica text cells,
//! JPEG images and URI links on A4 portrait pages. Serialization goes
//! through `pdf-writer`.

mod document;
mod font;
mod writer;

pub use document::{Color, PdfDocument, PdfImage, PAGE_MARGIN, PAGE_WIDTH};
