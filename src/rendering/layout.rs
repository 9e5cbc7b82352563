/// Grid line geometry for a drawing surface

use crate::{Error, Result};

/// Vertical line x-offsets and horizontal line y-offsets, in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLineSet {
    /// Distance between neighbouring lines; shared by columns and rows.
    pub spacing: f64,
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

impl GridLineSet {
    pub fn row_count(&self) -> usize {
        self.horizontal.len()
    }
}

/// Compute grid lines for a `width` x `height` surface split into `columns`.
///
/// - Spacing is `width / columns`, not rounded.
/// - `columns + 1` vertical lines at `spacing * (i + 1)`; the `columns`-th
///   sits on the right edge and the last one lies beyond it, so both are
///   clipped when stroked.
/// - Rows reuse the column spacing: `floor(height / spacing)` horizontal
///   lines, with no trailing line at the bottom edge.
pub fn compute_grid_lines(width: f64, height: f64, columns: u32) -> Result<GridLineSet> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(width) || !valid(height) || columns < 1 {
        return Err(Error::InvalidGeometryInput {
            width,
            height,
            columns,
        });
    }

    let spacing = width / columns as f64;
    let vertical = (0..=columns)
        .map(|i| spacing * (i as f64 + 1.0))
        .collect();

    let rows = (height / spacing).floor() as usize;
    let horizontal = (0..rows)
        .map(|i| spacing * (i as f64 + 1.0))
        .collect();

    Ok(GridLineSet {
        spacing,
        vertical,
        horizontal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout() {
        let g = compute_grid_lines(100.0, 50.0, 4).unwrap();
        assert_eq!(g.spacing, 25.0);
        assert_eq!(g.vertical, vec![25.0, 50.0, 75.0, 100.0, 125.0]);
        assert_eq!(g.horizontal, vec![25.0, 50.0]);
        assert_eq!(g.row_count(), 2);
    }

    #[test]
    fn single_column() {
        let g = compute_grid_lines(10.0, 35.0, 1).unwrap();
        assert_eq!(g.vertical, vec![10.0, 20.0]);
        assert_eq!(g.horizontal, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn short_surface_has_no_rows() {
        let g = compute_grid_lines(100.0, 10.0, 2).unwrap();
        assert!(g.horizontal.is_empty());
        assert_eq!(g.vertical.len(), 3);
    }

    #[test]
    fn spacing_is_not_rounded() {
        let g = compute_grid_lines(100.0, 50.0, 3).unwrap();
        assert!((g.spacing - 100.0 / 3.0).abs() < 1e-12);
        assert!((g.vertical[0] - 33.333_333).abs() < 1e-5);
        assert_eq!(g.horizontal.len(), 1);
    }

    #[test]
    fn rejects_invalid_input() {
        for (w, h, c) in [
            (0.0, 10.0, 1),
            (10.0, 0.0, 1),
            (-5.0, 10.0, 1),
            (10.0, 10.0, 0),
            (f64::NAN, 10.0, 2),
            (10.0, f64::INFINITY, 2),
        ] {
            let err = compute_grid_lines(w, h, c).unwrap_err();
            assert!(matches!(err, Error::InvalidGeometryInput { .. }));
        }
    }
}
