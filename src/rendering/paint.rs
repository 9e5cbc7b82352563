/// Paint command list for one render pass

use crate::color::Color;
use crate::rendering::layout::GridLineSet;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Copy the source image 1:1 onto the surface origin
    DrawImage,
    StrokeLine {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
    },
}

/// Build the command list for a surface: the image first, then vertical
/// lines spanning the full height, then horizontal lines spanning the full
/// width, in the order the geometry produced them.
pub fn grid_commands(
    grid: &GridLineSet,
    width: u32,
    height: u32,
    color: Color,
) -> Vec<PaintCommand> {
    let (w, h) = (width as f32, height as f32);
    let mut cmds = Vec::with_capacity(1 + grid.vertical.len() + grid.horizontal.len());
    cmds.push(PaintCommand::DrawImage);

    for &x in &grid.vertical {
        let x = x as f32;
        cmds.push(PaintCommand::StrokeLine { from: (x, 0.0), to: (x, h), color });
    }
    for &y in &grid.horizontal {
        let y = y as f32;
        cmds.push(PaintCommand::StrokeLine { from: (0.0, y), to: (w, y), color });
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::compute_grid_lines;

    #[test]
    fn image_comes_before_lines() {
        let grid = compute_grid_lines(100.0, 50.0, 4).unwrap();
        let cmds = grid_commands(&grid, 100, 50, Color::BLACK);
        assert_eq!(cmds.len(), 1 + 5 + 2);
        assert_eq!(cmds[0], PaintCommand::DrawImage);
        assert_eq!(
            cmds[1],
            PaintCommand::StrokeLine { from: (25.0, 0.0), to: (25.0, 50.0), color: Color::BLACK }
        );
        match cmds.last() {
            Some(PaintCommand::StrokeLine { from, to, .. }) => {
                assert_eq!(*from, (0.0, 50.0));
                assert_eq!(*to, (100.0, 50.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
