//! squGrid
//!
//! Drop an image, overlay a square grid on it, download the result.
//!
//! # Features
//!
//! - **Grid geometry**: column spacing from the image width, rows reuse the
//!   same spacing so cells come out square
//! - **Reactive re-render**: changing the column count or stroke colour
//!   re-renders the loaded image without decoding it again
//! - **Stale-decode protection**: a newer drop always wins over a slower,
//!   older decode
//! - **Export**: the composited image encoded in the dropped file's format
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use squgrid::{DroppedFile, ImageCrateDecoder, LatestSurface, WidgetConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let display = Arc::new(LatestSurface::new());
//! let widget =
//!     squgrid::new_widget(WidgetConfig::default(), Arc::new(ImageCrateDecoder), display.clone())?;
//!
//! let bytes = std::fs::read("photo.png")?;
//! widget.drop_file(DroppedFile::new("photo.png", "image/png", bytes)).await?;
//! widget.preferences().set_column_count(6.0);
//! widget.preferences().set_stroke_color_str("#ff0000")?;
//!
//! let download = widget.export()?;
//! println!("{} ({} bytes)", download.file_name, download.bytes.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod color;
pub mod coordinator;
pub mod display;
pub mod export;
pub mod preferences;
pub mod rendering;
pub mod source;
pub mod widget;

pub use color::Color;
pub use coordinator::{CoordinatorState, DecodeTicket, RenderCoordinator};
pub use display::{deliver, DisplaySink, DisplayUpdate, LatestSurface, NoopDisplay};
pub use export::{export_surface, ExportedImage};
pub use preferences::{PreferencesState, RenderParameters, SubscriptionId, DEFAULT_MAX_COLUMNS};
pub use rendering::{compute_grid_lines, render, DrawingSurface, GridLineSet};
pub use source::{DroppedFile, FileMeta, ImageCrateDecoder, ImageDecoder, ImageSource};
pub use widget::GridWidget;

/// Configuration for a widget instance
///
/// ```
/// let cfg = squgrid::WidgetConfig::default();
/// assert_eq!(cfg.column_count, 4);
/// assert_eq!(cfg.export_prefix, "squGrid_");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Initial number of columns
    pub column_count: u32,
    /// Largest column count the preferences will store
    pub max_column_count: u32,
    /// Initial stroke colour
    pub stroke_color: Color,
    /// Prepended to the dropped file's name when exporting
    pub export_prefix: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            column_count: 4,
            max_column_count: DEFAULT_MAX_COLUMNS,
            stroke_color: Color::BLACK,
            export_prefix: "squGrid_".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.column_count == 0 {
            return Err(Error::ConfigError("column_count must be at least 1".into()));
        }
        if self.column_count > self.max_column_count {
            return Err(Error::ConfigError(format!(
                "column_count {} exceeds max_column_count {}",
                self.column_count, self.max_column_count
            )));
        }
        Ok(())
    }

    pub fn render_parameters(&self) -> RenderParameters {
        RenderParameters {
            column_count: self.column_count,
            stroke_color: self.stroke_color,
        }
    }
}

/// Create a widget for the surrounding application.
pub fn new_widget(
    config: WidgetConfig,
    decoder: Arc<dyn ImageDecoder>,
    display: Arc<dyn DisplaySink>,
) -> Result<GridWidget> {
    GridWidget::new(config, decoder, display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WidgetConfig::default();
        assert_eq!(config.column_count, 4);
        assert_eq!(config.stroke_color, Color::BLACK);
        assert_eq!(config.render_parameters(), RenderParameters::default());
    }

    #[test]
    fn test_config_from_json() {
        let cfg =
            WidgetConfig::from_json_str(r##"{"column_count": 6, "stroke_color": "#ff0000"}"##)
                .unwrap();
        assert_eq!(cfg.column_count, 6);
        assert_eq!(cfg.stroke_color, Color::rgb(255, 0, 0));
        assert_eq!(cfg.export_prefix, "squGrid_");
        assert_eq!(cfg.max_column_count, DEFAULT_MAX_COLUMNS);

        assert!(matches!(
            WidgetConfig::from_json_str(r#"{"column_count": 0}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            WidgetConfig::from_json_str(r#"{"stroke_color": "blue"}"#),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_column_count_above_bound_is_rejected() {
        assert!(matches!(
            WidgetConfig::from_json_str(r#"{"column_count": 20, "max_column_count": 16}"#),
            Err(Error::ConfigError(_))
        ));
        let cfg = WidgetConfig::from_json_str(r#"{"column_count": 16, "max_column_count": 16}"#)
            .unwrap();
        assert_eq!(cfg.max_column_count, 16);
    }
}
