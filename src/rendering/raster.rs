/// Rasterizer: executes paint commands onto an RGBA buffer

use image::{imageops, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::rendering::paint::PaintCommand;
use crate::source::ImageSource;

/// Allocate a fresh transparent buffer the size of `source` and run `cmds`.
///
/// The destination rectangle equals the source rectangle, so `DrawImage`
/// is a straight copy and no resampling happens. Lines are 1px wide and
/// anything outside the buffer is clipped.
pub fn rasterize(source: &ImageSource, cmds: &[PaintCommand]) -> RgbaImage {
    let mut buf = RgbaImage::new(source.width(), source.height());
    for cmd in cmds {
        match cmd {
            PaintCommand::DrawImage => imageops::replace(&mut buf, source.pixels(), 0, 0),
            PaintCommand::StrokeLine { from, to, color } => {
                draw_line_segment_mut(&mut buf, *from, *to, color.to_rgba())
            }
        }
    }
    buf
}
