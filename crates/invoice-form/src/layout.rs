//! Field geometry for the pre-printed form
//!
//! All positions are millimetres from the top-left corner of the A4 page.
//! The shipped defaults can be overridden by a sparse persisted patch which
//! is deep-merged over them (see [`LayeredLayout`]).

use crate::keys::{Column, FieldKey, HeaderField};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Minimum width of a field or column after an edit (mm)
pub const MIN_WIDTH: f64 = 4.0;
/// Minimum line-item row height after an edit (mm)
pub const MIN_ROW_HEIGHT: f64 = 5.0;

/// Box of one named field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl FieldGeometry {
    const fn at(left: f64, top: f64, width: f64) -> Self {
        Self {
            left,
            top,
            width,
            height: None,
        }
    }
}

/// Horizontal extent of a table column; rows supply the vertical part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnGeometry {
    pub left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Columns {
    pub sno: ColumnGeometry,
    pub particulars: ColumnGeometry,
    pub qty: ColumnGeometry,
    pub rate: ColumnGeometry,
    pub amount_rs: ColumnGeometry,
    pub amount_p: ColumnGeometry,
}

impl Columns {
    pub fn get(&self, column: Column) -> &ColumnGeometry {
        match column {
            Column::Sno => &self.sno,
            Column::Particulars => &self.particulars,
            Column::Qty => &self.qty,
            Column::Rate => &self.rate,
            Column::AmountRs => &self.amount_rs,
            Column::AmountP => &self.amount_p,
        }
    }

    pub fn get_mut(&mut self, column: Column) -> &mut ColumnGeometry {
        match column {
            Column::Sno => &mut self.sno,
            Column::Particulars => &mut self.particulars,
            Column::Qty => &mut self.qty,
            Column::Rate => &mut self.rate,
            Column::AmountRs => &mut self.amount_rs,
            Column::AmountP => &mut self.amount_p,
        }
    }
}

/// Line-item table: shared row origin and height plus per-column extents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemsLayout {
    pub first_row_top: f64,
    pub row_height: f64,
    pub columns: Columns,
}

impl LineItemsLayout {
    /// Top of row `index` before calibration
    pub fn row_top(&self, index: usize) -> f64 {
        self.first_row_top + index as f64 * self.row_height
    }
}

/// Complete field geometry of the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub bill_no: FieldGeometry,
    pub date: FieldGeometry,
    pub challan_no: FieldGeometry,
    pub dispatch_through: FieldGeometry,
    pub po_no: FieldGeometry,
    pub ms: FieldGeometry,
    pub address1: FieldGeometry,
    pub address2: FieldGeometry,
    pub line_items: LineItemsLayout,
    pub total_rs: FieldGeometry,
    pub total_p: FieldGeometry,
    pub amount_words: FieldGeometry,
}

/// Positions measured on the scanned Sterling Enterprises invoice
pub const DEFAULT_LAYOUT: LayoutConfig = LayoutConfig {
    bill_no: FieldGeometry::at(31.1, 58.5, 37.0),
    date: FieldGeometry::at(84.7, 57.7, 35.0),
    challan_no: FieldGeometry::at(35.9, 66.5, 32.5),
    dispatch_through: FieldGeometry::at(106.2, 66.1, 33.4),
    po_no: FieldGeometry::at(160.5, 66.1, 34.8),
    ms: FieldGeometry::at(28.7, 75.9, 165.2),
    address1: FieldGeometry::at(29.5, 96.9, 164.8),
    address2: FieldGeometry::at(29.3, 86.2, 164.9),
    line_items: LineItemsLayout {
        first_row_top: 122.9,
        row_height: 8.5,
        columns: Columns {
            sno: ColumnGeometry {
                left: 7.8,
                width: 9.0,
            },
            particulars: ColumnGeometry {
                left: 20.3,
                width: 101.2,
            },
            qty: ColumnGeometry {
                left: 129.5,
                width: 13.2,
            },
            rate: ColumnGeometry {
                left: 144.9,
                width: 17.0,
            },
            amount_rs: ColumnGeometry {
                left: 169.2,
                width: 19.4,
            },
            amount_p: ColumnGeometry {
                left: 192.7,
                width: 6.2,
            },
        },
    },
    total_rs: FieldGeometry::at(165.7, 251.6, 21.5),
    total_p: FieldGeometry::at(191.9, 251.0, 5.9),
    amount_words: FieldGeometry::at(17.0, 245.4, 109.4),
};

impl Default for LayoutConfig {
    fn default() -> Self {
        DEFAULT_LAYOUT
    }
}

/// Round to one decimal millimetre
pub fn round_mm(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whether committed coordinates are snapped to 0.1 mm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Snap {
    Tenth,
    Exact,
}

impl Snap {
    fn apply(self, value: f64) -> f64 {
        match self {
            Snap::Tenth => round_mm(value),
            Snap::Exact => value,
        }
    }
}

impl LayoutConfig {
    /// Geometry of a field with its own box (headers, totals, amount words)
    pub fn field(&self, key: FieldKey) -> Option<&FieldGeometry> {
        match key {
            FieldKey::Header(h) => Some(match h {
                HeaderField::BillNo => &self.bill_no,
                HeaderField::Date => &self.date,
                HeaderField::ChallanNo => &self.challan_no,
                HeaderField::DispatchThrough => &self.dispatch_through,
                HeaderField::PoNo => &self.po_no,
                HeaderField::Ms => &self.ms,
                HeaderField::Address1 => &self.address1,
                HeaderField::Address2 => &self.address2,
            }),
            FieldKey::TotalRs => Some(&self.total_rs),
            FieldKey::TotalP => Some(&self.total_p),
            FieldKey::AmountWords => Some(&self.amount_words),
            FieldKey::Column(_) | FieldKey::RowHeight => None,
        }
    }

    pub fn field_mut(&mut self, key: FieldKey) -> Option<&mut FieldGeometry> {
        match key {
            FieldKey::Header(h) => Some(match h {
                HeaderField::BillNo => &mut self.bill_no,
                HeaderField::Date => &mut self.date,
                HeaderField::ChallanNo => &mut self.challan_no,
                HeaderField::DispatchThrough => &mut self.dispatch_through,
                HeaderField::PoNo => &mut self.po_no,
                HeaderField::Ms => &mut self.ms,
                HeaderField::Address1 => &mut self.address1,
                HeaderField::Address2 => &mut self.address2,
            }),
            FieldKey::TotalRs => Some(&mut self.total_rs),
            FieldKey::TotalP => Some(&mut self.total_p),
            FieldKey::AmountWords => Some(&mut self.amount_words),
            FieldKey::Column(_) | FieldKey::RowHeight => None,
        }
    }

    pub fn column(&self, column: Column) -> &ColumnGeometry {
        self.line_items.columns.get(column)
    }

    /// Shift a field by a delta
    ///
    /// A column only moves horizontally on its own; a vertical delta moves
    /// the shared first row and so the whole table. `row_height` is not
    /// movable. Coordinates are rounded to 0.1 mm.
    pub fn moved(&self, key: FieldKey, d_left: f64, d_top: f64) -> LayoutConfig {
        self.shifted(key, d_left, d_top, Snap::Tenth)
    }

    /// Grow or shrink a width (or the shared row height for `row_height`)
    ///
    /// Widths never drop below [`MIN_WIDTH`], the row height never below
    /// [`MIN_ROW_HEIGHT`]. Results are rounded to 0.1 mm.
    pub fn resized(&self, key: FieldKey, delta: f64) -> LayoutConfig {
        self.stretched(key, delta, Snap::Tenth)
    }

    pub(crate) fn shifted(&self, key: FieldKey, d_left: f64, d_top: f64, snap: Snap) -> LayoutConfig {
        let mut next = self.clone();
        if d_left == 0.0 && d_top == 0.0 {
            return next;
        }

        match key {
            FieldKey::Column(column) => {
                let geometry = next.line_items.columns.get_mut(column);
                geometry.left = snap.apply(geometry.left + d_left);
                if d_top != 0.0 {
                    next.line_items.first_row_top =
                        snap.apply(next.line_items.first_row_top + d_top);
                }
            }
            FieldKey::RowHeight => {
                debug!("row height cannot be moved");
            }
            _ => {
                if let Some(geometry) = next.field_mut(key) {
                    geometry.left = snap.apply(geometry.left + d_left);
                    geometry.top = snap.apply(geometry.top + d_top);
                }
            }
        }

        next
    }

    pub(crate) fn stretched(&self, key: FieldKey, delta: f64, snap: Snap) -> LayoutConfig {
        let mut next = self.clone();
        if delta == 0.0 {
            return next;
        }

        match key {
            FieldKey::RowHeight => {
                let height = snap.apply(next.line_items.row_height + delta);
                if height < MIN_ROW_HEIGHT {
                    debug!(height, "row height clamped");
                }
                next.line_items.row_height = height.max(MIN_ROW_HEIGHT);
            }
            FieldKey::Column(column) => {
                let geometry = next.line_items.columns.get_mut(column);
                geometry.width = clamp_width(snap.apply(geometry.width + delta), key);
            }
            _ => {
                if let Some(geometry) = next.field_mut(key) {
                    geometry.width = clamp_width(snap.apply(geometry.width + delta), key);
                }
            }
        }

        next
    }

    /// Build from the persisted override, falling back to defaults
    ///
    /// Unparseable or ill-typed overrides are logged and ignored.
    pub fn from_persisted(raw: Option<&str>) -> LayoutConfig {
        let Some(raw) = raw else {
            return DEFAULT_LAYOUT;
        };

        let overrides = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "discarding unreadable layout override");
                return DEFAULT_LAYOUT;
            }
        };

        match LayeredLayout::new(Some(overrides)).resolve() {
            Ok(layout) => layout,
            Err(e) => {
                warn!(error = %e, "discarding invalid layout override");
                DEFAULT_LAYOUT
            }
        }
    }
}

fn clamp_width(width: f64, key: FieldKey) -> f64 {
    if width < MIN_WIDTH {
        debug!(%key, width, "width clamped");
    }
    width.max(MIN_WIDTH)
}

/// Two-level layout: shipped defaults plus an optional sparse override
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredLayout {
    defaults: Value,
    overrides: Option<Value>,
}

impl LayeredLayout {
    /// Layer an override over [`DEFAULT_LAYOUT`]
    pub fn new(overrides: Option<Value>) -> Self {
        Self {
            defaults: serde_json::to_value(DEFAULT_LAYOUT).unwrap_or(Value::Null),
            overrides,
        }
    }

    /// The merged JSON value
    pub fn merged(&self) -> Value {
        match &self.overrides {
            Some(patch) => deep_merge(&self.defaults, patch),
            None => self.defaults.clone(),
        }
    }

    /// Merge and decode into a typed layout
    pub fn resolve(&self) -> Result<LayoutConfig, serde_json::Error> {
        serde_json::from_value(self.merged())
    }
}

/// Merge `patch` over `base`
///
/// Objects present on both sides merge key by key; any other patch value
/// replaces the base value at that position.
pub fn deep_merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, patch_value) in patch_map {
                let value = match merged.get(key) {
                    Some(base_value) => deep_merge(base_value, patch_value),
                    None => patch_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (_, patch) => patch.clone(),
    }
}
