//! Invoice Form - fill a pre-printed invoice and export it as PDF
//!
//! This crate provides:
//! - The field layout with its shipped defaults and a persisted override
//! - The multi-page invoice document and its pure edits
//! - Drag and resize gestures over the page in millimetres
//! - Screen and print views sharing one field-box resolver
//! - PDF export over any [`PageSurface`]
//! - An [`Editor`] session persisting to a [`KvStore`]
//!
//! # Example
//!
//! ```
//! use invoice_form::{Column, Editor, MemoryStore};
//!
//! let mut editor = Editor::open(MemoryStore::new());
//! editor.update_line_item(0, 0, Column::Qty, "2");
//! editor.update_line_item(0, 0, Column::Rate, "150.25");
//!
//! let page = editor.document().page(0).unwrap();
//! assert_eq!(page.total_rs, "300");
//! assert_eq!(page.total_p, "50");
//! assert_eq!(page.amount_words, "Rupees Three Hundred and Fifty Paise Only");
//! ```

pub mod document;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod keys;
pub mod layout;
pub mod settings;
pub mod store;
pub mod style;
pub mod view;

pub use document::{Document, LineItem, Page, MAX_ROWS};
pub use editor::{Editor, KeyInput};
pub use export::{
    export_file_name, render_document, ExportArtifact, ExportError, ExportInputs, ExportOptions,
    Exporter, LayoutSource, PageSurface, PdfSurface, FALLBACK_FILE_NAME,
};
pub use geometry::{resolve_field_box, Calibration, FieldBox, PixelScale, TextAlign};
pub use gesture::{
    Gesture, LayoutCommit, LiveDelta, PointerPos, PointerTarget, PositioningEngine,
};
pub use keys::{Column, FieldKey, HeaderField, PageField};
pub use layout::{
    deep_merge, ColumnGeometry, FieldGeometry, LayeredLayout, LayoutConfig, LineItemsLayout,
    DEFAULT_LAYOUT,
};
pub use settings::Settings;
pub use store::{FileStore, KvStore, MemoryStore, StoreError};
pub use style::{effective_font, FieldStyleOverride, FontSpec, StyleProperty, FONT_FAMILIES};
pub use view::{build_page_view, build_print_view, FieldControl, Handle, PageView};

use thiserror::Error;

/// Errors raised by the invoice editor
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid style property: {0}")]
    InvalidStyle(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for invoice operations
pub type Result<T> = std::result::Result<T, InvoiceError>;
