//! Background image embedding

use crate::{PdfError, Result};
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }

    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Image XObject ready to be added to a document
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"
    pub color_space: &'static str,
    /// "DCTDecode" for JPEG passthrough, "FlateDecode" for decoded pixels
    pub filter: &'static str,
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Build an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is embedded as-is; only the header is read
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();

        let color_space = match decoder.color_type() {
            ColorType::L8 | ColorType::L16 => "DeviceGray",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width,
            height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// PNG data is decoded, alpha blended onto white and deflated
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (raw, color_space) = match color_type {
            ColorType::L8 | ColorType::L16 => (image.to_luma8().into_raw(), "DeviceGray"),
            ColorType::La8 | ColorType::La16 => {
                let gray = image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| blend_on_white(p[0], p[1]))
                    .collect();
                (gray, "DeviceGray")
            }
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity(rgba.as_raw().len() / 4 * 3);
                for p in rgba.pixels() {
                    rgb.extend_from_slice(&[
                        blend_on_white(p[0], p[3]),
                        blend_on_white(p[1], p[3]),
                        blend_on_white(p[2], p[3]),
                    ]);
                }
                (rgb, "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data: deflate(&raw)?,
        })
    }

    /// Convert to a lopdf stream
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", 8_i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));

        Stream::new(dict, self.data.clone())
    }
}

fn blend_on_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as f32 / 255.0;
    (channel as f32 * a + 255.0 * (1.0 - a)) as u8
}

/// zlib-compress bytes for a FlateDecode stream
pub(crate) fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Operators drawing an image resource into a box
///
/// `x`, `y` are PDF coordinates of the lower-left corner.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
