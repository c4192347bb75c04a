//! Standard 14 font selection and metrics
//!
//! Pages are drawn with the built-in PDF base fonts so nothing needs to be
//! embedded. Widths come from the Adobe core AFM files (units per 1000 em)
//! and cover printable ASCII; other WinAnsi characters use the family's
//! average advance.

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Base font families available without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum StandardFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl StandardFamily {
    /// Map a host font family name onto the closest base font
    ///
    /// Unknown names fall back to Helvetica.
    pub fn from_family_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "times new roman" | "times" | "georgia" | "serif" => StandardFamily::Times,
            "courier new" | "courier" | "monospace" => StandardFamily::Courier,
            _ => StandardFamily::Helvetica,
        }
    }
}

/// One face of a base font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StandardFont {
    pub family: StandardFamily,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl StandardFont {
    pub fn new(family: StandardFamily, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// PostScript name used as `/BaseFont`
    pub fn base_font_name(&self) -> &'static str {
        use FontStyle::*;
        use FontWeight::*;
        use StandardFamily::*;

        match (self.family, self.weight, self.style) {
            (Helvetica, Regular, Normal) => "Helvetica",
            (Helvetica, Bold, Normal) => "Helvetica-Bold",
            (Helvetica, Regular, Italic) => "Helvetica-Oblique",
            (Helvetica, Bold, Italic) => "Helvetica-BoldOblique",
            (Times, Regular, Normal) => "Times-Roman",
            (Times, Bold, Normal) => "Times-Bold",
            (Times, Regular, Italic) => "Times-Italic",
            (Times, Bold, Italic) => "Times-BoldItalic",
            (Courier, Regular, Normal) => "Courier",
            (Courier, Bold, Normal) => "Courier-Bold",
            (Courier, Regular, Italic) => "Courier-Oblique",
            (Courier, Bold, Italic) => "Courier-BoldOblique",
        }
    }

    /// Page resource name (stable per face, e.g. "F6")
    pub fn resource_name(&self) -> String {
        let family = match self.family {
            StandardFamily::Helvetica => 0,
            StandardFamily::Times => 4,
            StandardFamily::Courier => 8,
        };
        let variant = match (self.weight, self.style) {
            (FontWeight::Regular, FontStyle::Normal) => 1,
            (FontWeight::Bold, FontStyle::Normal) => 2,
            (FontWeight::Regular, FontStyle::Italic) => 3,
            (FontWeight::Bold, FontStyle::Italic) => 4,
        };
        format!("F{}", family + variant)
    }

    /// Advance width of one WinAnsi byte in 1/1000 em
    pub fn char_width(&self, byte: u8) -> u16 {
        let table = match (self.family, self.weight, self.style) {
            (StandardFamily::Courier, _, _) => return COURIER_WIDTH,
            (StandardFamily::Helvetica, FontWeight::Regular, _) => &HELVETICA,
            (StandardFamily::Helvetica, FontWeight::Bold, _) => &HELVETICA_BOLD,
            (StandardFamily::Times, FontWeight::Regular, FontStyle::Normal) => &TIMES_ROMAN,
            (StandardFamily::Times, FontWeight::Bold, FontStyle::Normal) => &TIMES_BOLD,
            (StandardFamily::Times, FontWeight::Regular, FontStyle::Italic) => &TIMES_ITALIC,
            (StandardFamily::Times, FontWeight::Bold, FontStyle::Italic) => &TIMES_BOLD_ITALIC,
        };

        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => match self.family {
                StandardFamily::Helvetica => 556,
                StandardFamily::Times => 500,
                StandardFamily::Courier => COURIER_WIDTH,
            },
        }
    }

    /// Width of already-encoded text in points
    pub fn encoded_width_points(&self, encoded: &[u8], font_size: f32) -> f64 {
        let units: u32 = encoded.iter().map(|b| self.char_width(*b) as u32).sum();
        units as f64 * font_size as f64 / 1000.0
    }

    /// Width of text in points
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f64 {
        self.encoded_width_points(&encode_win_ansi(text), font_size)
    }
}

/// Encode text for a base font (WinAnsiEncoding)
///
/// Latin-1 maps through unchanged, the typographic punctuation of the
/// 0x80-0x9F block is translated, anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => match c {
                '\t' => b' ',
                '€' => 0x80,
                '‚' => 0x82,
                '„' => 0x84,
                '…' => 0x85,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '™' => 0x99,
                _ => b'?',
            },
        })
        .collect()
}

const COURIER_WIDTH: u16 = 600;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 675, 675, 675, 500, 920,
    611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
    667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
    389, 278, 389, 422, 500, 333,
    500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
    500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
    400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 832,
    667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
    722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
    333, 278, 333, 570, 500, 333,
    500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
    556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
    348, 220, 348, 570,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_mapping() {
        assert_eq!(StandardFamily::from_family_name("Arial"), StandardFamily::Helvetica);
        assert_eq!(StandardFamily::from_family_name("Verdana"), StandardFamily::Helvetica);
        assert_eq!(StandardFamily::from_family_name("Times New Roman"), StandardFamily::Times);
        assert_eq!(StandardFamily::from_family_name("Georgia"), StandardFamily::Times);
        assert_eq!(StandardFamily::from_family_name("Courier New"), StandardFamily::Courier);
        assert_eq!(StandardFamily::from_family_name("Comic Sans"), StandardFamily::Helvetica);
    }

    #[test]
    fn test_base_font_names() {
        let bold_italic = StandardFont::new(StandardFamily::Times, FontWeight::Bold, FontStyle::Italic);
        assert_eq!(bold_italic.base_font_name(), "Times-BoldItalic");
        assert_eq!(StandardFont::default().base_font_name(), "Helvetica");
    }

    #[test]
    fn test_resource_names_are_unique() {
        let mut names = std::collections::HashSet::new();
        for family in [StandardFamily::Helvetica, StandardFamily::Times, StandardFamily::Courier] {
            for weight in [FontWeight::Regular, FontWeight::Bold] {
                for style in [FontStyle::Normal, FontStyle::Italic] {
                    names.insert(StandardFont::new(family, weight, style).resource_name());
                }
            }
        }
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_text_width() {
        let helvetica = StandardFont::default();
        // "AB" = 667 + 667 units
        assert!((helvetica.text_width_points("AB", 10.0) - 13.34).abs() < 1e-9);

        let courier = StandardFont::new(StandardFamily::Courier, FontWeight::Bold, FontStyle::Normal);
        assert!((courier.text_width_points("abc", 10.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Rs 10"), b"Rs 10".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("₹5"), vec![b'?', b'5']);
        assert_eq!(encode_win_ansi("“x”"), vec![0x93, b'x', 0x94]);
    }
}
