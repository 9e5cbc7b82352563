/// Display sinks: where rendered surfaces are published

use std::sync::{Arc, Mutex};

use crate::rendering::DrawingSurface;
use crate::source::FileMeta;

/// Presents surfaces to the user.
///
/// `present` replaces whatever was shown before; `clear` returns the view to
/// its idle state (the drop prompt). `show_error` carries user-facing text
/// for decode failures.
///
/// The widget calls sinks with none of its locks held, so a sink may read
/// widget state or change preferences from inside a callback.
pub trait DisplaySink: Send + Sync {
    fn present(&self, surface: Arc<DrawingSurface>, meta: &FileMeta);
    fn clear(&self);
    fn show_error(&self, message: &str);
}

/// A queued sink call, produced by the coordinator and delivered later
#[derive(Debug, Clone)]
pub enum DisplayUpdate {
    Present(Arc<DrawingSurface>, FileMeta),
    Clear,
    Error(String),
}

impl DisplayUpdate {
    pub fn apply(self, sink: &dyn DisplaySink) {
        match self {
            DisplayUpdate::Present(surface, meta) => sink.present(surface, &meta),
            DisplayUpdate::Clear => sink.clear(),
            DisplayUpdate::Error(message) => sink.show_error(&message),
        }
    }
}

/// Apply `updates` in order.
pub fn deliver(sink: &dyn DisplaySink, updates: Vec<DisplayUpdate>) {
    for update in updates {
        update.apply(sink);
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDisplay;

impl DisplaySink for NoopDisplay {
    fn present(&self, _surface: Arc<DrawingSurface>, _meta: &FileMeta) {}
    fn clear(&self) {}
    fn show_error(&self, _message: &str) {}
}

#[derive(Debug, Default)]
struct Shown {
    surface: Option<(Arc<DrawingSurface>, FileMeta)>,
    last_error: Option<String>,
    presents: usize,
}

/// Keeps the most recently presented surface in memory
#[derive(Debug, Default)]
pub struct LatestSurface {
    shown: Mutex<Shown>,
}

impl LatestSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self) -> Option<Arc<DrawingSurface>> {
        let shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        shown.surface.as_ref().map(|(s, _)| s.clone())
    }

    pub fn meta(&self) -> Option<FileMeta> {
        let shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        shown.surface.as_ref().map(|(_, m)| m.clone())
    }

    pub fn last_error(&self) -> Option<String> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).last_error.clone()
    }

    /// Number of `present` calls so far
    pub fn present_count(&self) -> usize {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).presents
    }
}

impl DisplaySink for LatestSurface {
    fn present(&self, surface: Arc<DrawingSurface>, meta: &FileMeta) {
        let mut shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        shown.surface = Some((surface, meta.clone()));
        shown.last_error = None;
        shown.presents += 1;
    }

    fn clear(&self) {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).surface = None;
    }

    fn show_error(&self, message: &str) {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).last_error = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::RenderParameters;
    use crate::rendering::render;
    use crate::source::ImageSource;
    use image::RgbaImage;

    #[test]
    fn latest_surface_tracks_present_and_clear() {
        let sink = LatestSurface::new();
        assert!(sink.surface().is_none());

        let img = ImageSource::new(RgbaImage::new(4, 4)).unwrap();
        let surface = Arc::new(render(&img, &RenderParameters::default()).unwrap());
        let meta = FileMeta { name: "x.png".into(), mime_type: "image/png".into() };

        sink.show_error("boom");
        sink.present(surface.clone(), &meta);
        assert_eq!(sink.surface().unwrap().width(), 4);
        assert_eq!(sink.meta().unwrap(), meta);
        assert!(sink.last_error().is_none());
        assert_eq!(sink.present_count(), 1);

        sink.clear();
        assert!(sink.surface().is_none());
    }

    #[test]
    fn deliver_applies_in_order() {
        let sink = LatestSurface::new();
        let img = ImageSource::new(RgbaImage::new(2, 2)).unwrap();
        let surface = Arc::new(render(&img, &RenderParameters::default()).unwrap());
        deliver(
            &sink,
            vec![
                DisplayUpdate::Present(surface, FileMeta::default()),
                DisplayUpdate::Clear,
                DisplayUpdate::Error("bad file".into()),
            ],
        );
        assert!(sink.surface().is_none());
        assert_eq!(sink.present_count(), 1);
        assert_eq!(sink.last_error().as_deref(), Some("bad file"));
    }
}
