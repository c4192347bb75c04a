//! PDF export
//!
//! [`render_document`] replays every page onto a [`PageSurface`] using the
//! same field boxes as the on-screen view. [`Exporter`] wraps it with the
//! single-export guard, error reporting and file naming.

use crate::document::{Document, Page};
use crate::geometry::{
    resolve_field_box, Calibration, TextAlign, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use crate::keys::{Column, FieldKey, HeaderField};
use crate::layout::{LayoutConfig, DEFAULT_LAYOUT};
use crate::style::{effective_font, FontSpec};
use pdf_core::{mm_to_pt, PdfDocument, PdfError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{error, info};

/// File name used when the first page has no bill number
pub const FALLBACK_FILE_NAME: &str = "sterling-invoice.pdf";

/// Drawing target for an export; all coordinates in mm from the top-left
pub trait PageSurface {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start a new page; later calls draw on it
    fn add_page(&mut self) -> Result<(), Self::Error>;

    fn draw_image(
        &mut self,
        data: &[u8],
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), Self::Error>;

    fn set_font(&mut self, font: &FontSpec) -> Result<(), Self::Error>;

    /// Draw text with its baseline at `y`; wrap when `max_width` is given
    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: TextAlign,
        max_width: Option<f64>,
    ) -> Result<(), Self::Error>;

    fn finish(self) -> Result<Vec<u8>, Self::Error>
    where
        Self: Sized;
}

/// [`PageSurface`] over a [`PdfDocument`]
#[derive(Default)]
pub struct PdfSurface {
    doc: PdfDocument,
    page: usize,
}

impl PdfSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageSurface for PdfSurface {
    type Error = PdfError;

    fn add_page(&mut self) -> Result<(), PdfError> {
        self.page = self.doc.add_blank_page();
        Ok(())
    }

    fn draw_image(
        &mut self,
        data: &[u8],
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), PdfError> {
        self.doc.insert_image(
            data,
            self.page,
            mm_to_pt(x),
            mm_to_pt(y),
            mm_to_pt(width),
            mm_to_pt(height),
        )
    }

    fn set_font(&mut self, font: &FontSpec) -> Result<(), PdfError> {
        self.doc.set_font(font.pdf_font(), font.size);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: TextAlign,
        max_width: Option<f64>,
    ) -> Result<(), PdfError> {
        match max_width {
            Some(width) => {
                self.doc.insert_text_wrapped(
                    text,
                    self.page,
                    mm_to_pt(x),
                    mm_to_pt(y),
                    mm_to_pt(width),
                    align.into(),
                )?;
                Ok(())
            }
            None => self
                .doc
                .insert_text(text, self.page, mm_to_pt(x), mm_to_pt(y), align.into()),
        }
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        self.doc.to_bytes()
    }
}

/// Everything an export reads
#[derive(Debug, Clone, Copy)]
pub struct ExportInputs<'a> {
    pub document: &'a Document,
    pub layout: &'a LayoutConfig,
    pub calibration: &'a Calibration,
    pub font: &'a FontSpec,
    /// Scanned form image (JPEG or PNG) stretched over each page
    pub background: &'a [u8],
}

/// Which layout positions the exported text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutSource {
    /// The layout the editor shows, override included
    #[default]
    Stored,
    /// The shipped defaults, ignoring any override
    Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub layout_source: LayoutSource,
    pub fallback_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout_source: LayoutSource::Stored,
            fallback_name: FALLBACK_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,

    #[error("PDF generation failed")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write into `dir` under [`file_name`](Self::file_name)
    ///
    /// The bytes go to a temporary sibling first and are renamed into place.
    pub fn write_to_dir(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        let tmp = dir.join(format!(".{}.tmp", self.file_name));
        fs::write(&tmp, &self.bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }
}

/// `invoice-<billNo>.pdf`, or `fallback` without a usable bill number
pub fn export_file_name(bill_no: Option<&str>, fallback: &str) -> String {
    let cleaned: String = bill_no
        .unwrap_or_default()
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.');

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        format!("invoice-{cleaned}.pdf")
    }
}

/// Draw every page of the document onto `surface`
pub fn render_document<S: PageSurface>(surface: &mut S, inputs: &ExportInputs) -> Result<(), S::Error> {
    for page in inputs.document.pages() {
        surface.add_page()?;
        surface.draw_image(inputs.background, 0.0, 0.0, PAGE_WIDTH_MM, PAGE_HEIGHT_MM)?;
        render_page(surface, page, inputs)?;
    }
    Ok(())
}

fn render_page<S: PageSurface>(surface: &mut S, page: &Page, inputs: &ExportInputs) -> Result<(), S::Error> {
    for field in HeaderField::ALL {
        draw_field(
            surface,
            page,
            inputs,
            FieldKey::Header(field),
            None,
            page.header(field),
            TextAlign::Left,
            false,
        )?;
    }

    for (row, item) in page.line_items.iter().enumerate() {
        for column in Column::ALL {
            draw_field(
                surface,
                page,
                inputs,
                FieldKey::Column(column),
                Some(row),
                item.get(column),
                column.align(),
                column == Column::Particulars,
            )?;
        }
    }

    draw_field(surface, page, inputs, FieldKey::TotalRs, None, &page.total_rs, TextAlign::Right, false)?;
    draw_field(surface, page, inputs, FieldKey::TotalP, None, &page.total_p, TextAlign::Right, false)?;
    draw_field(
        surface,
        page,
        inputs,
        FieldKey::AmountWords,
        None,
        &page.amount_words,
        TextAlign::Left,
        true,
    )
}

#[allow(clippy::too_many_arguments)]
fn draw_field<S: PageSurface>(
    surface: &mut S,
    page: &Page,
    inputs: &ExportInputs,
    key: FieldKey,
    row: Option<usize>,
    value: &str,
    align: TextAlign,
    wrap: bool,
) -> Result<(), S::Error> {
    if value.is_empty() {
        return Ok(());
    }
    let Some(field_box) = resolve_field_box(key, row, inputs.layout, inputs.calibration) else {
        return Ok(());
    };

    let font = effective_font(key, page.field_styles.get(&key), inputs.font);
    surface.set_font(&font)?;
    surface.draw_text(
        value,
        field_box.anchor_x(align),
        field_box.baseline(font.size),
        align,
        wrap.then_some(field_box.width),
    )
}

/// Clears the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs exports one at a time
#[derive(Debug, Default)]
pub struct Exporter {
    in_flight: AtomicBool,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Export to PDF bytes
    pub fn export(
        &self,
        inputs: &ExportInputs,
        options: &ExportOptions,
    ) -> Result<ExportArtifact, ExportError> {
        self.export_with(PdfSurface::new(), inputs, options)
    }

    /// Export onto a caller-supplied surface
    ///
    /// A call made while another export runs fails with
    /// [`ExportError::Busy`]. Any surface failure is logged and reported as
    /// [`ExportError::Failed`].
    pub fn export_with<S: PageSurface>(
        &self,
        mut surface: S,
        inputs: &ExportInputs,
        options: &ExportOptions,
    ) -> Result<ExportArtifact, ExportError> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(ExportError::Busy)?;

        let inputs = ExportInputs {
            layout: match options.layout_source {
                LayoutSource::Stored => inputs.layout,
                LayoutSource::Defaults => &DEFAULT_LAYOUT,
            },
            ..*inputs
        };

        let bytes = render_document(&mut surface, &inputs)
            .and_then(|()| surface.finish())
            .map_err(|e| {
                error!(error = %e, "PDF generation failed");
                ExportError::Failed(Box::new(e))
            })?;

        let file_name = export_file_name(inputs.document.bill_no(), &options.fallback_name);
        info!(
            file_name = %file_name,
            pages = inputs.document.page_count(),
            size = bytes.len(),
            "invoice exported"
        );

        Ok(ExportArtifact { file_name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PageField;
    use crate::style::StyleProperty;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::fmt;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Page,
        Image { x: f64, y: f64, width: f64, height: f64 },
        Text {
            text: String,
            x: f64,
            y: f64,
            align: TextAlign,
            max_width: Option<f64>,
            font: FontSpec,
        },
    }

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "surface broke")
        }
    }

    impl std::error::Error for Broken {}

    #[derive(Default)]
    struct Recording {
        ops: Vec<Op>,
        font: FontSpec,
        fail_on_text: bool,
    }

    impl PageSurface for Recording {
        type Error = Broken;

        fn add_page(&mut self) -> Result<(), Broken> {
            self.ops.push(Op::Page);
            Ok(())
        }

        fn draw_image(&mut self, _: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<(), Broken> {
            self.ops.push(Op::Image { x, y, width, height });
            Ok(())
        }

        fn set_font(&mut self, font: &FontSpec) -> Result<(), Broken> {
            self.font = font.clone();
            Ok(())
        }

        fn draw_text(
            &mut self,
            text: &str,
            x: f64,
            y: f64,
            align: TextAlign,
            max_width: Option<f64>,
        ) -> Result<(), Broken> {
            if self.fail_on_text {
                return Err(Broken);
            }
            self.ops.push(Op::Text {
                text: text.to_string(),
                x,
                y,
                align,
                max_width,
                font: self.font.clone(),
            });
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, Broken> {
            Ok(format!("{:?}", self.ops).into_bytes())
        }
    }

    fn texts(ops: &[Op]) -> Vec<&Op> {
        ops.iter().filter(|op| matches!(op, Op::Text { .. })).collect()
    }

    fn find<'a>(ops: &'a [Op], wanted: &str) -> &'a Op {
        ops.iter()
            .find(|op| matches!(op, Op::Text { text, .. } if text == wanted))
            .unwrap()
    }

    fn find_last<'a>(ops: &'a [Op], wanted: &str) -> &'a Op {
        ops.iter()
            .rev()
            .find(|op| matches!(op, Op::Text { text, .. } if text == wanted))
            .unwrap()
    }

    fn sample() -> Document {
        Document::new()
            .update_header_field(0, PageField::Header(HeaderField::BillNo), "117")
            .update_line_item(0, 0, Column::Particulars, "Brass fittings")
            .update_line_item(0, 0, Column::Qty, "4")
            .update_line_item(0, 0, Column::Rate, "12.5")
            .add_page()
    }

    fn render(doc: &Document, layout: &LayoutConfig, cal: &Calibration) -> Vec<Op> {
        let font = FontSpec::default();
        let mut surface = Recording::default();
        let inputs = ExportInputs {
            document: doc,
            layout,
            calibration: cal,
            font: &font,
            background: b"",
        };
        render_document(&mut surface, &inputs).unwrap();
        surface.ops
    }

    #[test]
    fn test_one_page_per_document_page() {
        let ops = render(&sample(), &DEFAULT_LAYOUT, &Calibration::default());

        let pages: Vec<usize> = ops
            .iter()
            .enumerate()
            .filter(|(_, op)| **op == Op::Page)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(
            ops[pages[0] + 1],
            Op::Image { x: 0.0, y: 0.0, width: 210.0, height: 297.0 }
        );
        // second page only carries its sno cell
        assert_eq!(ops.len() - pages[1], 3);
    }

    #[test]
    fn test_skips_empty_values() {
        let doc = Document::new();
        let ops = render(&doc, &DEFAULT_LAYOUT, &Calibration::default());
        let drawn: Vec<&Op> = texts(&ops);
        assert_eq!(drawn.len(), 1);
        assert!(matches!(drawn[0], Op::Text { text, .. } if text == "1"));
    }

    #[test]
    fn test_text_positions_follow_layout_and_calibration() {
        let cal = Calibration::new(2.0, -1.0);
        let ops = render(&sample(), &DEFAULT_LAYOUT, &cal);
        let baseline = 11.0 * 0.3528 * 0.72;

        let Op::Text { x, y, align, max_width, .. } = find(&ops, "117") else {
            unreachable!()
        };
        assert!((x - 30.1).abs() < 1e-9);
        assert!((y - (58.5 + 2.0 + baseline)).abs() < 1e-9);
        assert_eq!(*align, TextAlign::Left);
        assert_eq!(*max_width, None);

        let Op::Text { x, align, max_width, .. } = find(&ops, "Brass fittings") else {
            unreachable!()
        };
        assert!((x - 19.3).abs() < 1e-9);
        assert_eq!(*align, TextAlign::Left);
        assert_eq!(*max_width, Some(101.2));

        let Op::Text { x, align, .. } = find(&ops, "4") else {
            unreachable!()
        };
        assert!((x - (129.5 + 6.6 - 1.0)).abs() < 1e-9);
        assert_eq!(*align, TextAlign::Center);

        let Op::Text { x, align, .. } = find(&ops, "12.5") else {
            unreachable!()
        };
        assert!((x - (144.9 + 17.0 - 1.0)).abs() < 1e-9);
        assert_eq!(*align, TextAlign::Right);
    }

    #[test]
    fn test_totals_bold_and_words_wrapped() {
        let ops = render(&sample(), &DEFAULT_LAYOUT, &Calibration::default());

        // row amount first, page total last
        let Op::Text { font, .. } = find(&ops, "50") else {
            unreachable!()
        };
        assert!(!font.bold);
        let Op::Text { font, align, .. } = find_last(&ops, "50") else {
            unreachable!()
        };
        assert!(font.bold);
        assert_eq!(*align, TextAlign::Right);

        let Op::Text { max_width, font, .. } = find(&ops, "Rupees Fifty Only") else {
            unreachable!()
        };
        assert_eq!(*max_width, Some(109.4));
        assert!(!font.bold);
    }

    #[test]
    fn test_field_override_applies() {
        let doc = sample()
            .set_field_style(0, FieldKey::Header(HeaderField::BillNo), StyleProperty::Size(16.0))
            .set_field_style(0, FieldKey::TotalRs, StyleProperty::Bold(false));
        let ops = render(&doc, &DEFAULT_LAYOUT, &Calibration::default());

        let Op::Text { font, y, .. } = find(&ops, "117") else {
            unreachable!()
        };
        assert_eq!(font.size, 16.0);
        assert!((y - (58.5 + 16.0 * 0.3528 * 0.72)).abs() < 1e-9);

        let Op::Text { font, .. } = find_last(&ops, "50") else {
            unreachable!()
        };
        assert!(!font.bold);
    }

    #[test]
    fn test_exporter_layout_source() {
        let doc = sample();
        let moved = DEFAULT_LAYOUT.moved(FieldKey::Header(HeaderField::BillNo), 10.0, 0.0);
        let font = FontSpec::default();
        let cal = Calibration::default();
        let inputs = ExportInputs {
            document: &doc,
            layout: &moved,
            calibration: &cal,
            font: &font,
            background: b"",
        };
        let exporter = Exporter::new();

        let stored = exporter
            .export_with(Recording::default(), &inputs, &ExportOptions::default())
            .unwrap();
        assert_eq!(stored.file_name, "invoice-117.pdf");

        let options = ExportOptions {
            layout_source: LayoutSource::Defaults,
            ..ExportOptions::default()
        };
        let mut surface = Recording::default();
        render_document(
            &mut surface,
            &ExportInputs {
                layout: &DEFAULT_LAYOUT,
                ..inputs
            },
        )
        .unwrap();
        let expected = surface.finish().unwrap();
        let defaults = exporter
            .export_with(Recording::default(), &inputs, &options)
            .unwrap();
        assert_eq!(defaults.bytes, expected);
        assert_ne!(stored.bytes, defaults.bytes);
    }

    #[test]
    fn test_failure_is_reported_and_flag_cleared() {
        let doc = sample();
        let font = FontSpec::default();
        let cal = Calibration::default();
        let inputs = ExportInputs {
            document: &doc,
            layout: &DEFAULT_LAYOUT,
            calibration: &cal,
            font: &font,
            background: b"",
        };
        let exporter = Exporter::new();
        let surface = Recording {
            fail_on_text: true,
            ..Recording::default()
        };

        let err = exporter
            .export_with(surface, &inputs, &ExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::Failed(_)));
        assert_eq!(err.to_string(), "PDF generation failed");
        assert!(!exporter.is_busy());

        assert!(exporter
            .export_with(Recording::default(), &inputs, &ExportOptions::default())
            .is_ok());
    }

    /// Surface that tries to start a second export while the first runs
    struct Reentrant<'a> {
        exporter: &'a Exporter,
        inputs: ExportInputs<'a>,
        nested: &'a RefCell<Option<Result<ExportArtifact, ExportError>>>,
    }

    impl PageSurface for Reentrant<'_> {
        type Error = Broken;

        fn add_page(&mut self) -> Result<(), Broken> {
            let result = self.exporter.export_with(
                Recording::default(),
                &self.inputs,
                &ExportOptions::default(),
            );
            *self.nested.borrow_mut() = Some(result);
            Ok(())
        }

        fn draw_image(&mut self, _: &[u8], _: f64, _: f64, _: f64, _: f64) -> Result<(), Broken> {
            Ok(())
        }

        fn set_font(&mut self, _: &FontSpec) -> Result<(), Broken> {
            Ok(())
        }

        fn draw_text(&mut self, _: &str, _: f64, _: f64, _: TextAlign, _: Option<f64>) -> Result<(), Broken> {
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, Broken> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_second_export_while_running_is_busy() {
        let doc = Document::new();
        let font = FontSpec::default();
        let cal = Calibration::default();
        let inputs = ExportInputs {
            document: &doc,
            layout: &DEFAULT_LAYOUT,
            calibration: &cal,
            font: &font,
            background: b"",
        };
        let exporter = Exporter::new();
        let nested = RefCell::new(None);
        let surface = Reentrant {
            exporter: &exporter,
            inputs,
            nested: &nested,
        };

        let outer = exporter.export_with(surface, &inputs, &ExportOptions::default());
        assert!(outer.is_ok());
        assert!(matches!(nested.into_inner(), Some(Err(ExportError::Busy))));
        assert!(!exporter.is_busy());
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(Some("117"), FALLBACK_FILE_NAME), "invoice-117.pdf");
        assert_eq!(export_file_name(Some("SE/24/9"), FALLBACK_FILE_NAME), "invoice-SE-24-9.pdf");
        assert_eq!(export_file_name(Some("  "), FALLBACK_FILE_NAME), "sterling-invoice.pdf");
        assert_eq!(export_file_name(Some("../"), FALLBACK_FILE_NAME), "sterling-invoice.pdf");
        assert_eq!(export_file_name(None, "draft.pdf"), "draft.pdf");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact {
            file_name: "invoice-1.pdf".to_string(),
            bytes: b"%PDF-1.5".to_vec(),
        };
        let path = artifact.write_to_dir(&dir.path().join("out")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");
        assert!(!dir.path().join("out/.invoice-1.pdf.tmp").exists());
    }
}
