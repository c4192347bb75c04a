//! Field identifiers
//!
//! Keys keep the string forms used by the persisted layout and style maps:
//! header names (`billNo`), `col_<column>` for table columns and
//! `row_height` for the shared row height.

use crate::geometry::TextAlign;
use crate::InvoiceError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Header fields at the top of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderField {
    BillNo,
    Date,
    ChallanNo,
    DispatchThrough,
    PoNo,
    Ms,
    Address1,
    Address2,
}

impl HeaderField {
    pub const ALL: [HeaderField; 8] = [
        HeaderField::BillNo,
        HeaderField::Date,
        HeaderField::ChallanNo,
        HeaderField::DispatchThrough,
        HeaderField::PoNo,
        HeaderField::Ms,
        HeaderField::Address1,
        HeaderField::Address2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderField::BillNo => "billNo",
            HeaderField::Date => "date",
            HeaderField::ChallanNo => "challanNo",
            HeaderField::DispatchThrough => "dispatchThrough",
            HeaderField::PoNo => "poNo",
            HeaderField::Ms => "ms",
            HeaderField::Address1 => "address1",
            HeaderField::Address2 => "address2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeaderField::BillNo => "Bill No.",
            HeaderField::Date => "Date",
            HeaderField::ChallanNo => "Challan No.",
            HeaderField::DispatchThrough => "Dispatch Through",
            HeaderField::PoNo => "P.O. No",
            HeaderField::Ms => "M/s",
            HeaderField::Address1 => "Address line 1",
            HeaderField::Address2 => "Address line 2",
        }
    }

    /// Hint shown in an empty input
    pub fn placeholder(self) -> &'static str {
        match self {
            HeaderField::Date => "DD/MM/YYYY",
            other => other.label(),
        }
    }
}

/// Line-item table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Sno,
    Particulars,
    Qty,
    Rate,
    AmountRs,
    AmountP,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Sno,
        Column::Particulars,
        Column::Qty,
        Column::Rate,
        Column::AmountRs,
        Column::AmountP,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Sno => "sno",
            Column::Particulars => "particulars",
            Column::Qty => "qty",
            Column::Rate => "rate",
            Column::AmountRs => "amountRs",
            Column::AmountP => "amountP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Sno => "S.No",
            Column::Particulars => "Particulars",
            Column::Qty => "Qty",
            Column::Rate => "Rate",
            Column::AmountRs => "Amount Rs",
            Column::AmountP => "Amount P",
        }
    }

    pub fn align(self) -> TextAlign {
        match self {
            Column::Sno | Column::Qty => TextAlign::Center,
            Column::Particulars => TextAlign::Left,
            Column::Rate | Column::AmountRs | Column::AmountP => TextAlign::Right,
        }
    }

    /// Placeholder for a cell; `sno` shows the row number instead
    pub fn placeholder(self) -> &'static str {
        match self {
            Column::Sno => "",
            Column::Particulars => "Particulars",
            Column::Qty => "Qty",
            Column::Rate => "Rate",
            Column::AmountRs => "0",
            Column::AmountP => "00",
        }
    }

    /// Whether editing this cell recomputes the row amount
    pub fn drives_amount(self) -> bool {
        matches!(self, Column::Qty | Column::Rate)
    }
}

impl FromStr for Column {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| InvoiceError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values a page holds outside the line-item table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageField {
    Header(HeaderField),
    TotalRs,
    TotalP,
    AmountWords,
}

impl PageField {
    pub fn key(self) -> FieldKey {
        match self {
            PageField::Header(h) => FieldKey::Header(h),
            PageField::TotalRs => FieldKey::TotalRs,
            PageField::TotalP => FieldKey::TotalP,
            PageField::AmountWords => FieldKey::AmountWords,
        }
    }

    /// Editing a total refreshes the amount in words
    pub fn is_total(self) -> bool {
        matches!(self, PageField::TotalRs | PageField::TotalP)
    }
}

impl FromStr for PageField {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<FieldKey>()? {
            FieldKey::Header(h) => Ok(PageField::Header(h)),
            FieldKey::TotalRs => Ok(PageField::TotalRs),
            FieldKey::TotalP => Ok(PageField::TotalP),
            FieldKey::AmountWords => Ok(PageField::AmountWords),
            _ => Err(InvoiceError::UnknownField(s.to_string())),
        }
    }
}

impl fmt::Display for PageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key().fmt(f)
    }
}

/// Identifier of anything positionable on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Header(HeaderField),
    TotalRs,
    TotalP,
    AmountWords,
    Column(Column),
    RowHeight,
}

impl FieldKey {
    /// Keys with their own box in the layout, in tuning-panel order
    pub fn positioned() -> Vec<FieldKey> {
        HeaderField::ALL
            .into_iter()
            .map(FieldKey::Header)
            .chain([FieldKey::TotalRs, FieldKey::TotalP, FieldKey::AmountWords])
            .collect()
    }

    /// Every key a style override or gesture can name
    pub fn all() -> Vec<FieldKey> {
        let mut keys = Self::positioned();
        keys.extend(Column::ALL.into_iter().map(FieldKey::Column));
        keys.push(FieldKey::RowHeight);
        keys
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Header(h) => h.label(),
            FieldKey::TotalRs => "Total Rs",
            FieldKey::TotalP => "Total Paise",
            FieldKey::AmountWords => "Amount in Words",
            FieldKey::Column(c) => c.label(),
            FieldKey::RowHeight => "Row Height",
        }
    }

    pub fn column(self) -> Option<Column> {
        match self {
            FieldKey::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_total(self) -> bool {
        matches!(self, FieldKey::TotalRs | FieldKey::TotalP)
    }
}

impl FromStr for FieldKey {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(column) = s.strip_prefix("col_") {
            return column.parse().map(FieldKey::Column);
        }

        match s {
            "totalRs" => Ok(FieldKey::TotalRs),
            "totalP" => Ok(FieldKey::TotalP),
            "amountWords" => Ok(FieldKey::AmountWords),
            "row_height" => Ok(FieldKey::RowHeight),
            _ => HeaderField::ALL
                .into_iter()
                .find(|h| h.as_str() == s)
                .map(FieldKey::Header)
                .ok_or_else(|| InvoiceError::UnknownField(s.to_string())),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Header(h) => f.write_str(h.as_str()),
            FieldKey::TotalRs => f.write_str("totalRs"),
            FieldKey::TotalP => f.write_str("totalP"),
            FieldKey::AmountWords => f.write_str("amountWords"),
            FieldKey::Column(c) => write!(f, "col_{}", c.as_str()),
            FieldKey::RowHeight => f.write_str("row_height"),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
