use super::ExtractError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Longest side, in pixels, of an image sent to the model.
pub const MAX_DIMENSION: u32 = 1024;

/// JPEG bytes ready to inline into a generation request.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

pub(super) fn encode_image(path: &Path) -> Result<EncodedImage, ExtractError> {
    let img = image::open(path).map_err(|e| ExtractError::Image(e.to_string()))?;
    encode_jpeg(downscale(img))
}

/// Shrink so neither side exceeds [`MAX_DIMENSION`], keeping the aspect ratio.
/// Images already within bounds are returned untouched.
pub fn downscale(img: DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return img;
    }
    img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle)
}

fn encode_jpeg(img: DynamicImage) -> Result<EncodedImage, ExtractError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .map_err(|e| ExtractError::Image(e.to_string()))?;
    Ok(EncodedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}
