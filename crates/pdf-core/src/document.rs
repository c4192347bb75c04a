//! PDF Document builder

use crate::font::{encode_win_ansi, StandardFont};
use crate::image::{deflate, generate_image_operators, ImageXObject};
use crate::text::{
    generate_text_operators, hex_string, wrap_to_width, TextRenderContext, LINE_HEIGHT_FACTOR,
};
use crate::{Align, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// A4 page width in points
pub const A4_WIDTH: f64 = 595.28;
/// A4 page height in points
pub const A4_HEIGHT: f64 = 841.89;

/// Operators and resources collected for one page
#[derive(Debug, Default)]
struct PageBuffer {
    content: Vec<u8>,
    fonts: BTreeSet<StandardFont>,
    /// Resource name -> index into `PdfDocument::images`
    images: BTreeMap<String, usize>,
}

/// In-memory PDF builder with A4 pages
///
/// Coordinates passed to the drawing methods are in points measured from
/// the top-left corner of the page. Conversion to the PDF bottom-left
/// origin happens here.
#[derive(Debug)]
pub struct PdfDocument {
    pages: Vec<PageBuffer>,
    current_font: StandardFont,
    current_font_size: f32,
    /// Decoded images, shared across pages
    images: Vec<ImageXObject>,
    /// Image data hash -> index into `images`
    image_index: HashMap<u64, usize>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current_font: StandardFont::default(),
            current_font_size: 11.0,
            images: Vec::new(),
            image_index: HashMap::new(),
        }
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a blank A4 page and return its number (1-indexed)
    pub fn add_blank_page(&mut self) -> usize {
        self.pages.push(PageBuffer::default());
        self.pages.len()
    }

    /// Select the font face and size used by subsequent text
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        self.current_font = font;
        self.current_font_size = size;
    }

    /// Width of `text` in points with the current font
    pub fn text_width(&self, text: &str) -> f64 {
        self.current_font
            .text_width_points(text, self.current_font_size)
    }

    /// Insert a single line of text
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate of the alignment anchor in points
    /// * `y` - Baseline in points (from top)
    /// * `align` - Text alignment
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let font = self.current_font;
        let encoded = encode_win_ansi(text);
        let ctx = TextRenderContext {
            font_name: font.resource_name(),
            font_size: self.current_font_size,
            text_width: font.encoded_width_points(&encoded, self.current_font_size),
        };

        let operators =
            generate_text_operators(&hex_string(&encoded), x, A4_HEIGHT - y, align, &ctx);

        let buffer = self.page_mut(page)?;
        buffer.fonts.insert(font);
        buffer.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Insert text wrapped to `max_width` points
    ///
    /// The first baseline sits at `y`; following lines advance by 1.15 times
    /// the font size. Returns the number of lines drawn.
    pub fn insert_text_wrapped(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        max_width: f64,
        align: Align,
    ) -> Result<usize> {
        self.check_page(page)?;

        let lines = wrap_to_width(text, self.current_font, self.current_font_size, max_width);
        let line_height = self.current_font_size as f64 * LINE_HEIGHT_FACTOR;

        for (i, line) in lines.iter().enumerate() {
            self.insert_text(line, page, x, y + i as f64 * line_height, align)?;
        }

        Ok(lines.len())
    }

    /// Insert an image stretched into a box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - Left edge in points
    /// * `y` - Top edge in points (from top)
    /// * `width` - Box width in points
    /// * `height` - Box height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.check_page(page)?;

        let index = self.image_for(data)?;
        let resource_name = format!("Im{}", index + 1);
        let operators =
            generate_image_operators(&resource_name, x, A4_HEIGHT - y - height, width, height);

        let buffer = self.page_mut(page)?;
        buffer.images.insert(resource_name, index);
        buffer.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Serialize the document
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.build()?;
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(())
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut PageBuffer> {
        let count = self.pages.len();
        page.checked_sub(1)
            .and_then(|i| self.pages.get_mut(i))
            .ok_or(PdfError::InvalidPage(page, count))
    }

    /// Decode an image once and return its index; identical bytes share it
    fn image_for(&mut self, data: &[u8]) -> Result<usize> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(&index) = self.image_index.get(&data_hash) {
            return Ok(index);
        }

        let xobject = ImageXObject::from_bytes(data)?;
        self.images.push(xobject);
        let index = self.images.len() - 1;
        self.image_index.insert(data_hash, index);
        Ok(index)
    }

    /// Assemble the lopdf object graph
    fn build(&self) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_ids: Vec<ObjectId> = self
            .images
            .iter()
            .map(|image| doc.add_object(image.to_pdf_stream()))
            .collect();

        let mut font_ids: BTreeMap<StandardFont, ObjectId> = BTreeMap::new();
        let mut kids = Vec::with_capacity(self.pages.len());

        for page in &self.pages {
            let mut fonts = Dictionary::new();
            for font in &page.fonts {
                let id = *font_ids.entry(*font).or_insert_with(|| {
                    doc.add_object(dictionary! {
                        "Type" => "Font",
                        "Subtype" => "Type1",
                        "BaseFont" => font.base_font_name(),
                        "Encoding" => "WinAnsiEncoding",
                    })
                });
                fonts.set(font.resource_name(), Object::Reference(id));
            }

            let mut xobjects = Dictionary::new();
            for (name, index) in &page.images {
                xobjects.set(name.as_str(), Object::Reference(image_ids[*index]));
            }

            let mut resources = Dictionary::new();
            if !fonts.is_empty() {
                resources.set("Font", Object::Dictionary(fonts));
            }
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let contents_id = doc.add_object(Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                deflate(&page.content)?,
            ));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(595.28),
                    Object::Real(841.89),
                ],
                "Resources" => resources,
                "Contents" => contents_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}
