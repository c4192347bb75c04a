//! Positioned controls for the on-screen editor and the print view

use crate::document::Page;
use crate::geometry::{resolve_field_box, Calibration, FieldBox, TextAlign};
use crate::keys::{Column, FieldKey, HeaderField};
use crate::layout::LayoutConfig;
use crate::style::{effective_font, FontSpec};
use serde::Serialize;

/// Handle width offset from a field's right edge (mm)
const HANDLE_INSET: f64 = 1.5;
/// Thickness of a grip across its drag axis (mm)
const GRIP: f64 = 3.0;
/// Height of a header field's width handle (mm)
const HANDLE_HEIGHT: f64 = 5.0;
/// Height of the amount-in-words text area (mm)
const AMOUNT_WORDS_HEIGHT: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Single-line input
    Input,
    /// Multi-line text area
    TextArea,
}

/// One editable element on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldControl {
    pub key: FieldKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub value: String,
    #[serde(rename = "box")]
    pub field_box: FieldBox,
    pub align: TextAlign,
    pub font: FontSpec,
    pub kind: ControlKind,
    pub placeholder: String,
    pub editable: bool,
    pub draggable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HandleKind {
    /// Right edge, drags horizontally
    Width,
    /// Bottom of the table, drags vertically
    RowHeight,
}

/// Resize grip shown in drag mode (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Handle {
    pub key: FieldKey,
    pub kind: HandleKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything drawn for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page_index: usize,
    pub controls: Vec<FieldControl>,
    pub handles: Vec<Handle>,
    /// Show the "(Continued)" marker
    pub continued: bool,
}

impl PageView {
    pub fn control(&self, key: FieldKey, row: Option<usize>) -> Option<&FieldControl> {
        self.controls.iter().find(|c| c.key == key && c.row == row)
    }
}

struct ViewBuilder<'a> {
    page: &'a Page,
    layout: &'a LayoutConfig,
    calibration: &'a Calibration,
    font: &'a FontSpec,
    drag_mode: bool,
    print: bool,
    controls: Vec<FieldControl>,
}

impl ViewBuilder<'_> {
    fn push(
        &mut self,
        key: FieldKey,
        row: Option<usize>,
        value: &str,
        align: TextAlign,
        kind: ControlKind,
        placeholder: String,
    ) {
        let Some(field_box) = resolve_field_box(key, row, self.layout, self.calibration) else {
            return;
        };

        self.controls.push(FieldControl {
            key,
            row,
            value: value.to_string(),
            field_box,
            align,
            font: effective_font(key, self.page.field_styles.get(&key), self.font),
            kind,
            placeholder: if self.print { String::new() } else { placeholder },
            editable: !self.drag_mode && !self.print,
            draggable: self.drag_mode && !self.print,
        });
    }

    fn headers(&mut self) {
        for field in HeaderField::ALL {
            self.push(
                FieldKey::Header(field),
                None,
                self.page.header(field),
                TextAlign::Left,
                ControlKind::Input,
                field.placeholder().to_string(),
            );
        }
    }

    fn line_items(&mut self) {
        let page = self.page;
        for (row, item) in page.line_items.iter().enumerate() {
            for column in Column::ALL {
                let placeholder = match column {
                    Column::Sno => (row + 1).to_string(),
                    _ if self.drag_mode => String::new(),
                    _ => column.placeholder().to_string(),
                };
                let kind = match column {
                    Column::Particulars => ControlKind::TextArea,
                    _ => ControlKind::Input,
                };
                self.push(
                    FieldKey::Column(column),
                    Some(row),
                    item.get(column),
                    column.align(),
                    kind,
                    placeholder,
                );
            }
        }
    }

    fn totals(&mut self) {
        let page = self.page;
        self.push(
            FieldKey::TotalRs,
            None,
            &page.total_rs,
            TextAlign::Right,
            ControlKind::Input,
            String::new(),
        );
        self.push(
            FieldKey::TotalP,
            None,
            &page.total_p,
            TextAlign::Right,
            ControlKind::Input,
            String::new(),
        );
        self.push(
            FieldKey::AmountWords,
            None,
            &page.amount_words,
            TextAlign::Left,
            ControlKind::TextArea,
            "Amount in words".to_string(),
        );
        if let Some(words) = self.controls.last_mut() {
            words.field_box.height = Some(words.field_box.height.unwrap_or(AMOUNT_WORDS_HEIGHT));
        }
    }
}

/// Build the on-screen view of one page
pub fn build_page_view(
    page_index: usize,
    page: &Page,
    layout: &LayoutConfig,
    calibration: &Calibration,
    font: &FontSpec,
    drag_mode: bool,
) -> PageView {
    let mut builder = ViewBuilder {
        page,
        layout,
        calibration,
        font,
        drag_mode,
        print: false,
        controls: Vec::new(),
    };
    builder.headers();
    builder.line_items();
    builder.totals();

    let handles = if drag_mode {
        resize_handles(page.line_items.len(), layout, calibration)
    } else {
        Vec::new()
    };

    PageView {
        page_index,
        controls: builder.controls,
        handles,
        continued: Page::is_continued(page_index),
    }
}

/// Build the printable view: same coordinates, values only, no handles
pub fn build_print_view(
    page_index: usize,
    page: &Page,
    layout: &LayoutConfig,
    calibration: &Calibration,
    font: &FontSpec,
) -> PageView {
    let mut builder = ViewBuilder {
        page,
        layout,
        calibration,
        font,
        drag_mode: false,
        print: true,
        controls: Vec::new(),
    };
    builder.headers();
    builder.line_items();
    builder.totals();

    PageView {
        page_index,
        controls: builder.controls,
        handles: Vec::new(),
        continued: false,
    }
}

fn resize_handles(rows: usize, layout: &LayoutConfig, cal: &Calibration) -> Vec<Handle> {
    let table = &layout.line_items;
    let mut handles = Vec::new();

    for key in FieldKey::positioned() {
        if let Some(geometry) = layout.field(key) {
            handles.push(Handle {
                key,
                kind: HandleKind::Width,
                left: geometry.left + geometry.width + cal.left - HANDLE_INSET,
                top: geometry.top + cal.top,
                width: GRIP,
                height: HANDLE_HEIGHT,
            });
        }
    }

    for column in Column::ALL {
        let geometry = table.columns.get(column);
        handles.push(Handle {
            key: FieldKey::Column(column),
            kind: HandleKind::Width,
            left: geometry.left + geometry.width + cal.left - HANDLE_INSET,
            top: table.row_top(0) + cal.top,
            width: GRIP,
            height: table.row_height * rows as f64,
        });
    }

    if rows > 0 {
        let sno = &table.columns.sno;
        let amount_p = &table.columns.amount_p;
        handles.push(Handle {
            key: FieldKey::RowHeight,
            kind: HandleKind::RowHeight,
            left: sno.left + cal.left,
            top: table.row_top(rows - 1) + table.row_height + cal.top,
            width: amount_p.left + amount_p.width - sno.left,
            height: GRIP,
        });
    }

    handles
}
