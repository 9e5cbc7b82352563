//! Rendering: grid geometry, paint commands, and rasterization.
//!
//! A render pass takes an `ImageSource` and a `RenderParameters` snapshot and
//! produces a brand-new `DrawingSurface` of the image's native size with the
//! grid composited on top. Prior surfaces are never touched.

pub mod layout;
pub mod paint;
pub mod raster;

use image::RgbaImage;
use sha2::{Digest, Sha256};

use crate::preferences::RenderParameters;
use crate::source::ImageSource;
use crate::Result;

pub use layout::{compute_grid_lines, GridLineSet};

/// Composited pixel buffer; its size always matches the image it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSurface {
    pixels: RgbaImage,
}

impl DrawingSurface {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Hex SHA-256 of the dimensions and raw RGBA bytes, for golden checks.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_be_bytes());
        hasher.update(self.height().to_be_bytes());
        hasher.update(self.pixels.as_raw());
        hex::encode(hasher.finalize())
    }
}

/// Run one render pass.
pub fn render(image: &ImageSource, params: &RenderParameters) -> Result<DrawingSurface> {
    let (width, height) = (image.width(), image.height());
    let grid = compute_grid_lines(width as f64, height as f64, params.column_count)?;
    let cmds = paint::grid_commands(&grid, width, height, params.stroke_color);
    log::debug!(
        "render pass {}x{}: {} columns, {} rows, stroke {}",
        width,
        height,
        params.column_count,
        grid.row_count(),
        params.stroke_color
    );
    Ok(DrawingSurface {
        pixels: raster::rasterize(image, &cmds),
    })
}
