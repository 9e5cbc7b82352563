//! Export of a composited surface as a downloadable file.
//!
//! The export keeps the dropped file's name (with a prefix) and, where the
//! encoder is available, its format. Anything else is written as PNG.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};

use crate::rendering::DrawingSurface;
use crate::source::FileMeta;
use crate::{Error, Result};

/// Encoded bytes ready to hand to a download link
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Pick the encoder for a source MIME type.
pub fn export_format(mime_type: &str) -> (ImageFormat, &'static str) {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        #[cfg(feature = "jpeg")]
        "image/jpeg" | "image/jpg" => (ImageFormat::Jpeg, "image/jpeg"),
        #[cfg(feature = "gif")]
        "image/gif" => (ImageFormat::Gif, "image/gif"),
        #[cfg(feature = "bmp")]
        "image/bmp" => (ImageFormat::Bmp, "image/bmp"),
        #[cfg(feature = "webp")]
        "image/webp" => (ImageFormat::WebP, "image/webp"),
        _ => (ImageFormat::Png, "image/png"),
    }
}

pub fn export_surface(
    surface: &DrawingSurface,
    meta: &FileMeta,
    prefix: &str,
) -> Result<ExportedImage> {
    let (format, mime_type) = export_format(&meta.mime_type);
    let rgba = DynamicImage::ImageRgba8(surface.pixels().clone());
    // JPEG has no alpha channel
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(rgba.to_rgb8())
    } else {
        rgba
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|e| Error::EncodeError(e.to_string()))?;

    Ok(ExportedImage {
        file_name: format!("{}{}", prefix, meta.name),
        mime_type: mime_type.to_string(),
        bytes: buf.into_inner(),
    })
}
