//! Dropped files and decoded image sources.

use std::sync::Arc;

use image::RgbaImage;

use crate::{Error, Result};

/// Name and MIME type of the file the user dropped; used to name the export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
}

/// A single file delivered by the drop surface
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub meta: FileMeta,
    pub bytes: Arc<Vec<u8>>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            meta: FileMeta {
                name: name.into(),
                mime_type: mime_type.into(),
            },
            bytes: Arc::new(bytes),
        }
    }
}

/// A decoded raster with positive dimensions.
///
/// Never mutated after construction; a new drop replaces it wholesale.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pixels: Arc<RgbaImage>,
}

impl ImageSource {
    pub fn new(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::DecodeFailure(format!(
                "image has empty dimensions {}x{}",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Turns a dropped file into an `ImageSource`.
///
/// Implementations run on a blocking worker, so they may take as long as
/// they need; the widget awaits the result without blocking the caller.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, file: &DroppedFile) -> Result<ImageSource>;
}

/// Decoder backed by the `image` crate; the format is sniffed from the bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    pub fn new() -> Self {
        ImageCrateDecoder
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, file: &DroppedFile) -> Result<ImageSource> {
        if file.bytes.is_empty() {
            return Err(Error::DecodeFailure(format!("{} is empty", file.meta.name)));
        }
        let decoded = image::load_from_memory(&file.bytes)?;
        ImageSource::new(decoded.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_png() {
        let file = DroppedFile::new("a.png", "image/png", png_bytes(7, 3));
        let src = ImageCrateDecoder::new().decode(&file).unwrap();
        assert_eq!((src.width(), src.height()), (7, 3));
        assert_eq!(src.pixels().get_pixel(6, 2), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let file = DroppedFile::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = ImageCrateDecoder::new().decode(&file).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));

        let empty = DroppedFile::new("empty.png", "image/png", Vec::new());
        assert!(matches!(
            ImageCrateDecoder::new().decode(&empty),
            Err(Error::DecodeFailure(_))
        ));
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        assert!(ImageSource::new(RgbaImage::new(0, 5)).is_err());
    }
}
