//! Text rendering utilities

use crate::font::StandardFont;
use crate::Align;

/// Line spacing as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
}

/// Calculate X offset for text alignment
pub fn calculate_x_offset(text_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => -text_width / 2.0,
        Align::Right => -text_width,
    }
}

/// Hex string operand for encoded text (e.g. "<48656C6C6F>")
pub fn hex_string(encoded: &[u8]) -> String {
    let mut out = String::with_capacity(encoded.len() * 2 + 2);
    out.push('<');
    for byte in encoded {
        out.push_str(&format!("{byte:02X}"));
    }
    out.push('>');
    out
}

/// Generate PDF operators for one line of text
///
/// `x` is the alignment anchor and `y` the baseline, both in PDF coordinates.
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let final_x = x + calculate_x_offset(ctx.text_width, align);

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str("0 0 0 rg\n");
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x:.3} {y:.3} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Split text into lines no wider than `max_width` points
///
/// Explicit newlines always break. Words are packed greedily; a single word
/// wider than the limit is broken between characters.
pub fn wrap_to_width(text: &str, font: StandardFont, font_size: f32, max_width: f64) -> Vec<String> {
    if max_width <= 0.0 {
        return text.lines().map(str::to_string).collect();
    }

    let width = |s: &str| font.text_width_points(s, font_size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if width(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if width(word) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    let mut next = current.clone();
                    next.push(ch);
                    if !current.is_empty() && width(&next) > max_width {
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    } else {
                        current = next;
                    }
                }
            }
        }

        lines.push(current);
    }

    lines
}
