//! PDF Core - Low-level PDF generation
//!
//! This crate provides functionality for:
//! - Building A4 documents page by page
//! - Drawing text with the standard base fonts
//! - Wrapping text to a width
//! - Inserting images (JPEG, PNG)
//!
//! # Example
//!
//! ```
//! use pdf_core::{Align, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.add_blank_page();
//! doc.set_font(StandardFont::default(), 12.0);
//! doc.insert_text("Hello, World!", page, 100.0, 100.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF"));
//! # Ok::<(), pdf_core::PdfError>(())
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{PdfDocument, A4_HEIGHT, A4_WIDTH};
pub use font::{encode_win_ansi, FontStyle, FontWeight, StandardFamily, StandardFont};
pub use image::{detect_format, ImageFormat, ImageXObject};
pub use text::{wrap_to_width, LINE_HEIGHT_FACTOR};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Points per millimetre
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimetres to points
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
