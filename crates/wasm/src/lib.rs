//! WASM bindings for the invoice form editor
//!
//! This crate provides a JavaScript-friendly API for:
//! - Editing the invoice draft (fields, line items, rows, pages, styles)
//! - Dragging and resizing fields over the rendered page
//! - Building the screen and print views
//! - Exporting the PDF
//!
//! State is kept in `localStorage` under the `invoice-*` keys.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { InvoiceEditor } from 'invoice-wasm';
//!
//! await init();
//!
//! const editor = new InvoiceEditor();
//! editor.updateLineItem(0, 0, 'qty', '4');
//! editor.updateLineItem(0, 0, 'rate', '12.50');
//! const pages = editor.pageViews();
//!
//! const { fileName, bytes } = editor.exportPdf(backgroundBytes);
//! ```

mod storage;

use invoice_form::{
    Calibration, Column, Editor, ExportOptions, FieldKey, FontSpec, PageField, PointerPos,
    PointerTarget, StyleProperty, FONT_FAMILIES,
};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

pub use storage::BrowserStore;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Serialize to plain JS objects (maps become objects, not `Map`)
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Resolve a pointer-down target from its kind and optional field key
///
/// Kinds are `rowHeight`, `width`, `field`; anything else is empty space.
fn pointer_target(kind: &str, key: Option<&str>) -> Result<PointerTarget, JsValue> {
    let field_key = || -> Result<FieldKey, JsValue> {
        key.ok_or_else(|| js_error(format!("pointer target '{kind}' needs a field key")))?
            .parse()
            .map_err(js_error)
    };
    Ok(match kind {
        "rowHeight" => PointerTarget::RowHeightHandle,
        "width" => PointerTarget::WidthHandle(field_key()?),
        "field" => PointerTarget::Field(field_key()?),
        _ => PointerTarget::Nothing,
    })
}

/// Amount formatting helpers
#[wasm_bindgen]
pub struct RupeeFormatter;

#[wasm_bindgen]
impl RupeeFormatter {
    /// Spell an amount
    ///
    /// @param rupees - Rupee digits (e.g., "100")
    /// @param paise - Paise digits (e.g., "50")
    /// @returns Sentence (e.g., "Rupees One Hundred and Fifty Paise Only")
    #[wasm_bindgen(js_name = amountToWords)]
    pub fn amount_to_words(rupees: &str, paise: &str) -> String {
        rupee_text::amount_to_words(rupees, paise)
    }

    /// Indian digit grouping (e.g., "1,23,456.50")
    #[wasm_bindgen(js_name = formatIndian)]
    pub fn format_indian(amount: f64, decimals: u8) -> String {
        rupee_text::format_indian(amount, decimals)
    }
}

/// Editing session bound to browser storage
#[wasm_bindgen]
pub struct InvoiceEditor {
    inner: Editor<BrowserStore>,
}

#[wasm_bindgen]
impl InvoiceEditor {
    /// Restore the saved session
    #[wasm_bindgen(constructor)]
    pub fn new() -> InvoiceEditor {
        InvoiceEditor {
            inner: Editor::open(BrowserStore::open()),
        }
    }

    /// Whether edits survive a reload
    #[wasm_bindgen(js_name = isPersistent)]
    pub fn is_persistent(&self) -> bool {
        self.inner.store().is_persistent()
    }

    /// Font families offered by the font panel
    #[wasm_bindgen(js_name = fontFamilies)]
    pub fn font_families() -> Vec<JsValue> {
        FONT_FAMILIES.iter().map(|f| JsValue::from_str(f)).collect()
    }

    // Document

    /// The draft as an array of pages
    pub fn document(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.document())
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.inner.document().page_count()
    }

    /// @param field - Header or total key (e.g., "billNo", "totalRs")
    #[wasm_bindgen(js_name = updateField)]
    pub fn update_field(&mut self, page: usize, field: &str, value: &str) -> Result<(), JsValue> {
        let field: PageField = field.parse().map_err(js_error)?;
        self.inner.update_field(page, field, value);
        Ok(())
    }

    /// @param column - "sno", "particulars", "qty", "rate", "amountRs" or "amountP"
    #[wasm_bindgen(js_name = updateLineItem)]
    pub fn update_line_item(
        &mut self,
        page: usize,
        row: usize,
        column: &str,
        value: &str,
    ) -> Result<(), JsValue> {
        let column: Column = column.parse().map_err(js_error)?;
        self.inner.update_line_item(page, row, column, value);
        Ok(())
    }

    #[wasm_bindgen(js_name = addRow)]
    pub fn add_row(&mut self, page: usize) {
        self.inner.add_row(page);
    }

    #[wasm_bindgen(js_name = removeRow)]
    pub fn remove_row(&mut self, page: usize, row: usize) {
        self.inner.remove_row(page, row);
    }

    #[wasm_bindgen(js_name = addPage)]
    pub fn add_page(&mut self) {
        self.inner.add_page();
    }

    #[wasm_bindgen(js_name = removePage)]
    pub fn remove_page(&mut self, page: usize) {
        self.inner.remove_page(page);
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) {
        self.inner.clear_all();
    }

    /// Override one font property of a field on a page
    ///
    /// @param key - Field key (e.g., "billNo", "col_rate")
    /// @param property - "family", "size", "bold" or "italic"
    /// @param value - Property value as text
    #[wasm_bindgen(js_name = setFieldStyle)]
    pub fn set_field_style(
        &mut self,
        page: usize,
        key: &str,
        property: &str,
        value: &str,
    ) -> Result<(), JsValue> {
        let key: FieldKey = key.parse().map_err(js_error)?;
        let property = StyleProperty::parse(property, value).map_err(js_error)?;
        self.inner.set_field_style(page, key, property);
        Ok(())
    }

    #[wasm_bindgen(js_name = clearFieldStyle)]
    pub fn clear_field_style(&mut self, page: usize, key: &str) -> Result<(), JsValue> {
        let key: FieldKey = key.parse().map_err(js_error)?;
        self.inner.clear_field_style(page, key);
        Ok(())
    }

    // Keyboard

    #[wasm_bindgen(js_name = focusRow)]
    pub fn focus_row(&mut self, page: usize, row: usize) {
        self.inner.focus_row(page, row);
    }

    #[wasm_bindgen(js_name = blurRow)]
    pub fn blur_row(&mut self) {
        self.inner.blur_row();
    }

    /// Handle a keydown; returns true when the host should prevent the default
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, ctrl: bool, meta: bool) -> bool {
        self.inner
            .handle_key(&invoice_form::KeyInput::new(key, ctrl, meta))
    }

    // Settings

    pub fn layout(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.layout())
    }

    #[wasm_bindgen(js_name = resetLayout)]
    pub fn reset_layout(&mut self) {
        self.inner.reset_layout();
    }

    pub fn calibration(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.calibration())
    }

    /// Set the page offset; snapped to 0.5 mm and clamped to the slider ranges
    #[wasm_bindgen(js_name = setCalibration)]
    pub fn set_calibration(&mut self, top: f64, left: f64) {
        self.inner
            .set_calibration(Calibration::new(top, left).clamped());
    }

    pub fn font(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.font())
    }

    /// @param font - { family, size, bold, italic }
    #[wasm_bindgen(js_name = setFont)]
    pub fn set_font(&mut self, font: JsValue) -> Result<(), JsValue> {
        let font: FontSpec = serde_wasm_bindgen::from_value(font)?;
        self.inner.set_font(font.validated().map_err(js_error)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = setFontProperty)]
    pub fn set_font_property(&mut self, property: &str, value: &str) -> Result<(), JsValue> {
        let property = StyleProperty::parse(property, value).map_err(js_error)?;
        let font = self.inner.font().clone().with(property).validated().map_err(js_error)?;
        self.inner.set_font(font);
        Ok(())
    }

    // Positioning

    #[wasm_bindgen(js_name = dragMode)]
    pub fn drag_mode(&self) -> bool {
        self.inner.drag_mode()
    }

    #[wasm_bindgen(js_name = setDragMode)]
    pub fn set_drag_mode(&mut self, on: bool) {
        self.inner.set_drag_mode(on);
    }

    /// Report the rendered page size in pixels
    #[wasm_bindgen(js_name = setRenderedSize)]
    pub fn set_rendered_size(&mut self, width_px: f64, height_px: f64) {
        self.inner.set_rendered_size(width_px, height_px);
    }

    /// Start a gesture
    ///
    /// @param kind - "rowHeight", "width", "field" or anything else for empty space
    /// @param key - Field key for "width" and "field"
    /// @returns Whether a gesture started
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        kind: &str,
        key: Option<String>,
        x: f64,
        y: f64,
    ) -> Result<bool, JsValue> {
        let target = pointer_target(kind, key.as_deref())?;
        Ok(self.inner.pointer_down(target, PointerPos::new(x, y)))
    }

    /// @returns The step since the last move, or undefined
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        match self.inner.pointer_move(PointerPos::new(x, y)) {
            Some(delta) => to_js(&delta),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// @returns The committed change, or undefined when no gesture ran
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.pointer_up() {
            Some(commit) => to_js(&commit),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // Views

    /// Positioned controls and handles for every page
    #[wasm_bindgen(js_name = pageViews)]
    pub fn page_views(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.page_views())
    }

    /// Values only, for the print stylesheet
    #[wasm_bindgen(js_name = printViews)]
    pub fn print_views(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.print_views())
    }

    // Export

    #[wasm_bindgen(js_name = isExporting)]
    pub fn is_exporting(&self) -> bool {
        self.inner.is_exporting()
    }

    /// Render the PDF
    ///
    /// @param background - Scanned form (JPEG or PNG bytes)
    /// @returns { fileName, bytes }
    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&self, background: &[u8]) -> Result<JsValue, JsValue> {
        let artifact = self
            .inner
            .export(background, &ExportOptions::default())
            .map_err(js_error)?;

        let result = js_sys::Object::new();
        js_sys::Reflect::set(
            &result,
            &JsValue::from_str("fileName"),
            &JsValue::from_str(&artifact.file_name),
        )?;
        js_sys::Reflect::set(
            &result,
            &JsValue::from_str("bytes"),
            &js_sys::Uint8Array::from(artifact.bytes.as_slice()),
        )?;
        Ok(result.into())
    }
}

impl Default for InvoiceEditor {
    fn default() -> Self {
        Self::new()
    }
}
