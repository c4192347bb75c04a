//! Typography: the global font and per-field overrides

use crate::keys::FieldKey;
use crate::{InvoiceError, Result};
use pdf_core::{FontStyle, FontWeight, StandardFamily, StandardFont};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Font families offered by the font panel
pub const FONT_FAMILIES: [&str; 5] = ["Arial", "Times New Roman", "Courier New", "Georgia", "Verdana"];

/// Default typography for every field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    /// Size in points
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 11.0,
            bold: false,
            italic: false,
        }
    }
}

impl FontSpec {
    /// Sizes the font panel offers, in points
    pub const SIZE_RANGE: RangeInclusive<f32> = 6.0..=24.0;

    /// Check a global font coming from outside the editor
    pub fn validated(self) -> Result<Self> {
        if !FONT_FAMILIES.contains(&self.family.as_str()) {
            return Err(InvoiceError::InvalidStyle(format!("family={}", self.family)));
        }
        if !Self::SIZE_RANGE.contains(&self.size) {
            return Err(InvoiceError::InvalidStyle(format!("size={}", self.size)));
        }
        Ok(self)
    }

    /// Base font face used when drawing this spec into a PDF
    pub fn pdf_font(&self) -> StandardFont {
        StandardFont::new(
            StandardFamily::from_family_name(&self.family),
            if self.bold {
                FontWeight::Bold
            } else {
                FontWeight::Regular
            },
            if self.italic {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            },
        )
    }

    pub fn with(mut self, property: StyleProperty) -> Self {
        match property {
            StyleProperty::Family(family) => self.family = family,
            StyleProperty::Size(size) => self.size = size,
            StyleProperty::Bold(bold) => self.bold = bold,
            StyleProperty::Italic(italic) => self.italic = italic,
        }
        self
    }
}

/// One font property set on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum StyleProperty {
    Family(String),
    Size(f32),
    Bold(bool),
    Italic(bool),
}

impl StyleProperty {
    /// Parse `name` / `value` pairs such as `("size", "12")`
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        let bad = || InvoiceError::InvalidStyle(format!("{name}={value}"));
        match name {
            "family" => Ok(StyleProperty::Family(value.to_string())),
            "size" => value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|size| size.is_finite() && *size > 0.0)
                .map(StyleProperty::Size)
                .ok_or_else(bad),
            "bold" => value.trim().parse().map(StyleProperty::Bold).map_err(|_| bad()),
            "italic" => value.trim().parse().map(StyleProperty::Italic).map_err(|_| bad()),
            _ => Err(bad()),
        }
    }
}

/// Partial font spec stored per field and page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

impl FieldStyleOverride {
    pub fn is_empty(&self) -> bool {
        self.family.is_none() && self.size.is_none() && self.bold.is_none() && self.italic.is_none()
    }

    /// Copy with one more property set
    pub fn with(&self, property: StyleProperty) -> Self {
        let mut next = self.clone();
        match property {
            StyleProperty::Family(family) => next.family = Some(family),
            StyleProperty::Size(size) => next.size = Some(size),
            StyleProperty::Bold(bold) => next.bold = Some(bold),
            StyleProperty::Italic(italic) => next.italic = Some(italic),
        }
        next
    }

    /// Properties present here win, the rest come from `base`
    pub fn merged_over(&self, base: &FontSpec) -> FontSpec {
        FontSpec {
            family: self.family.clone().unwrap_or_else(|| base.family.clone()),
            size: self.size.unwrap_or(base.size),
            bold: self.bold.unwrap_or(base.bold),
            italic: self.italic.unwrap_or(base.italic),
        }
    }
}

/// Font a field is drawn with
///
/// Totals are bold unless their override says otherwise.
pub fn effective_font(
    key: FieldKey,
    field_override: Option<&FieldStyleOverride>,
    global: &FontSpec,
) -> FontSpec {
    let mut font = match field_override {
        Some(style) => style.merged_over(global),
        None => global.clone(),
    };

    if key.is_total() && field_override.and_then(|s| s.bold).is_none() {
        font.bold = true;
    }

    font
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Column, HeaderField};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_font_spec_defaults() {
        let font: FontSpec = serde_json::from_str(r#"{"family": "Georgia"}"#).unwrap();
        assert_eq!(font.family, "Georgia");
        assert_eq!(font.size, 11.0);
        assert!(!font.bold);
    }

    #[test]
    fn test_global_font_validation() {
        let sized = |size| FontSpec { size, ..FontSpec::default() };
        assert!(sized(6.0).validated().is_ok());
        assert!(sized(24.0).validated().is_ok());
        for size in [0.0, -3.0, 5.5, 24.5, f32::NAN] {
            assert!(matches!(sized(size).validated(), Err(InvoiceError::InvalidStyle(_))));
        }

        let font = FontSpec {
            family: "Comic Sans".to_string(),
            ..FontSpec::default()
        };
        assert!(font.validated().is_err());
    }

    #[test]
    fn test_pdf_font_mapping() {
        let font = FontSpec {
            family: "Georgia".to_string(),
            bold: true,
            italic: true,
            ..FontSpec::default()
        };
        assert_eq!(font.pdf_font().base_font_name(), "Times-BoldItalic");

        let font = FontSpec {
            family: "Comic Sans".to_string(),
            ..FontSpec::default()
        };
        assert_eq!(font.pdf_font().base_font_name(), "Helvetica");
    }

    #[test]
    fn test_override_merges_per_property() {
        let global = FontSpec::default();
        let style = FieldStyleOverride::default()
            .with(StyleProperty::Size(14.0))
            .with(StyleProperty::Italic(true));

        let merged = style.merged_over(&global);
        assert_eq!(
            merged,
            FontSpec {
                family: "Arial".to_string(),
                size: 14.0,
                bold: false,
                italic: true,
            }
        );
    }

    #[test]
    fn test_totals_bold_by_default() {
        let global = FontSpec::default();
        assert!(effective_font(FieldKey::TotalRs, None, &global).bold);

        let plain = FieldStyleOverride::default().with(StyleProperty::Bold(false));
        assert!(!effective_font(FieldKey::TotalP, Some(&plain), &global).bold);

        let key = FieldKey::Header(HeaderField::Date);
        assert!(!effective_font(key, None, &global).bold);
        assert!(!effective_font(FieldKey::Column(Column::Qty), None, &global).bold);
    }

    #[test]
    fn test_style_property_parse() {
        assert_eq!(StyleProperty::parse("size", "12.5").unwrap(), StyleProperty::Size(12.5));
        assert_eq!(StyleProperty::parse("bold", "true").unwrap(), StyleProperty::Bold(true));
        assert!(StyleProperty::parse("size", "-3").is_err());
        assert!(StyleProperty::parse("color", "red").is_err());
        assert!(StyleProperty::parse("italic", "yes").is_err());
    }

    #[test]
    fn test_override_serializes_sparse() {
        let style = FieldStyleOverride::default().with(StyleProperty::Bold(true));
        assert_eq!(serde_json::to_string(&style).unwrap(), r#"{"bold":true}"#);
    }
}
