//! Page coordinates shared by the editor view and the PDF export

use crate::keys::FieldKey;
use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};

/// A4 page width (mm)
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 page height (mm)
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Millimetres per typographic point
pub const MM_PER_PT: f64 = 0.3528;
/// Fraction of the font size between a box top and the text baseline
pub const CAP_HEIGHT_RATIO: f64 = 0.72;

/// Page-wide translation applied after per-field layout (mm)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub top: f64,
    pub left: f64,
}

impl Calibration {
    /// Range offered for the vertical offset
    pub const TOP_RANGE: (f64, f64) = (-20.0, 20.0);
    /// Range offered for the horizontal offset
    pub const LEFT_RANGE: (f64, f64) = (-10.0, 10.0);
    /// Slider step
    pub const STEP: f64 = 0.5;

    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Snap to the slider step and keep within the offered ranges
    pub fn clamped(self) -> Self {
        let snap = |v: f64, (lo, hi): (f64, f64)| ((v / Self::STEP).round() * Self::STEP).clamp(lo, hi);
        Self {
            top: snap(self.top, Self::TOP_RANGE),
            left: snap(self.left, Self::LEFT_RANGE),
        }
    }
}

/// Horizontal text alignment within a box
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<TextAlign> for pdf_core::Align {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Left => pdf_core::Align::Left,
            TextAlign::Center => pdf_core::Align::Center,
            TextAlign::Right => pdf_core::Align::Right,
        }
    }
}

/// Resolved on-page box of a field, calibration applied (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl FieldBox {
    /// X coordinate text is anchored at for an alignment
    pub fn anchor_x(&self, align: TextAlign) -> f64 {
        match align {
            TextAlign::Left => self.left,
            TextAlign::Center => self.left + self.width / 2.0,
            TextAlign::Right => self.left + self.width,
        }
    }

    /// Baseline for text of `font_size_pt` placed in this box
    pub fn baseline(&self, font_size_pt: f32) -> f64 {
        self.top + baseline_offset(font_size_pt)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Distance from a box top to the baseline of its text (mm)
pub fn baseline_offset(font_size_pt: f32) -> f64 {
    font_size_pt as f64 * MM_PER_PT * CAP_HEIGHT_RATIO
}

/// Where a field sits on the page
///
/// Column keys need the row index (`None` means the first row) and get the
/// row height as box height. `row_height` has no box of its own.
pub fn resolve_field_box(
    key: FieldKey,
    row: Option<usize>,
    layout: &LayoutConfig,
    calibration: &Calibration,
) -> Option<FieldBox> {
    match key {
        FieldKey::Column(column) => {
            let table = &layout.line_items;
            let geometry = table.columns.get(column);
            Some(FieldBox {
                left: geometry.left + calibration.left,
                top: table.row_top(row.unwrap_or(0)) + calibration.top,
                width: geometry.width,
                height: Some(table.row_height),
            })
        }
        FieldKey::RowHeight => None,
        _ => layout.field(key).map(|geometry| FieldBox {
            left: geometry.left + calibration.left,
            top: geometry.top + calibration.top,
            width: geometry.width,
            height: geometry.height,
        }),
    }
}

/// Rendered pixels per millimetre on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub x: f64,
    pub y: f64,
}

impl PixelScale {
    /// Scale of a page rendered at `width_px` x `height_px`
    pub fn from_rendered_page(width_px: f64, height_px: f64) -> Self {
        Self {
            x: width_px / PAGE_WIDTH_MM,
            y: height_px / PAGE_HEIGHT_MM,
        }
    }

    pub fn px_to_mm_x(&self, px: f64) -> f64 {
        if self.x > 0.0 {
            px / self.x
        } else {
            0.0
        }
    }

    pub fn px_to_mm_y(&self, px: f64) -> f64 {
        if self.y > 0.0 {
            px / self.y
        } else {
            0.0
        }
    }
}

impl Default for PixelScale {
    /// One pixel per millimetre
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}
