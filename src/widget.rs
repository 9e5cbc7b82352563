use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::coordinator::{CoordinatorState, DecodeTicket, RenderCoordinator};
use crate::display::{deliver, DisplaySink};
use crate::export::{export_surface, ExportedImage};
use crate::preferences::{PreferencesState, SubscriptionId};
use crate::rendering::DrawingSurface;
use crate::source::{DroppedFile, ImageDecoder, ImageSource};
use crate::{Error, Result, WidgetConfig};

/// The grid overlay widget.
///
/// Construction wires the pieces in a fixed order: the display is cleared
/// to its idle view, preferences are created from the config, and finally
/// the coordinator is subscribed to preference changes so drops can be
/// accepted.
///
/// Decoding runs on tokio's blocking pool; everything else happens on the
/// caller's task. The coordinator lock is never held across an `.await`,
/// nor while the display sink runs.
pub struct GridWidget {
    config: WidgetConfig,
    display: Arc<dyn DisplaySink>,
    preferences: Arc<PreferencesState>,
    coordinator: Arc<Mutex<RenderCoordinator>>,
    decoder: Arc<dyn ImageDecoder>,
    subscription: SubscriptionId,
}

fn lock(c: &Mutex<RenderCoordinator>) -> MutexGuard<'_, RenderCoordinator> {
    c.lock().unwrap_or_else(|e| e.into_inner())
}

/// Re-render with the preferences as they are now, then show the result.
///
/// The snapshot is read under the coordinator lock, so whichever refresh
/// renders last renders the latest parameters.
fn refresh(
    coordinator: &Mutex<RenderCoordinator>,
    preferences: &Weak<PreferencesState>,
    display: &dyn DisplaySink,
) {
    let Some(preferences) = preferences.upgrade() else {
        return;
    };
    let updates = {
        let mut coordinator = lock(coordinator);
        let params = preferences.snapshot();
        if let Err(e) = coordinator.preferences_changed(&params) {
            log::error!("re-render after preference change failed: {}", e);
        }
        coordinator.take_display_updates()
    };
    deliver(display, updates);
}

impl GridWidget {
    pub fn new(
        config: WidgetConfig,
        decoder: Arc<dyn ImageDecoder>,
        display: Arc<dyn DisplaySink>,
    ) -> Result<Self> {
        config.validate()?;

        // surface
        display.clear();

        // preferences
        let preferences = Arc::new(PreferencesState::with_max_columns(
            config.render_parameters(),
            config.max_column_count,
        ));

        // drop target
        let coordinator = Arc::new(Mutex::new(RenderCoordinator::new()));
        let (c, d) = (coordinator.clone(), display.clone());
        let p = Arc::downgrade(&preferences);
        let subscription = preferences.subscribe(move |_| refresh(&c, &p, &*d));

        Ok(Self {
            config,
            display,
            preferences,
            coordinator,
            decoder,
            subscription,
        })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Shared handle for UI controls to call the setters on.
    pub fn preferences(&self) -> &Arc<PreferencesState> {
        &self.preferences
    }

    pub fn state(&self) -> CoordinatorState {
        lock(&self.coordinator).state()
    }

    pub fn surface(&self) -> Option<Arc<DrawingSurface>> {
        lock(&self.coordinator).surface()
    }

    /// Message from the last failed decode, if the widget is showing one.
    pub fn last_error(&self) -> Option<Error> {
        lock(&self.coordinator).last_error().cloned()
    }

    /// Handle a drop. Only the first file is used; an empty drop is ignored.
    pub async fn drop_files(&self, files: Vec<DroppedFile>) -> Result<CoordinatorState> {
        match files.into_iter().next() {
            Some(file) => self.drop_file(file).await,
            None => Ok(self.state()),
        }
    }

    /// Decode `file` and render it.
    ///
    /// Decode failures, including a decoder that panics, are shown through
    /// the display and leave the widget `Idle`; they are not returned as
    /// errors. If another file is dropped while this one decodes, this
    /// call's result is discarded and the state reported is whatever the
    /// newer drop has produced so far.
    pub async fn drop_file(&self, file: DroppedFile) -> Result<CoordinatorState> {
        let ticket = self.begin_drop(file);
        let generation = ticket.generation;
        let decoder = self.decoder.clone();

        let task = tokio::task::spawn_blocking(move || decoder.decode(&ticket.file));
        let decoded = match task.await {
            Ok(decoded) => decoded,
            Err(e) => Err(Error::DecodeFailure(format!("decode task failed: {}", e))),
        };

        self.complete_decode(generation, decoded)
    }

    /// Start a load without decoding; pair with `complete_decode`.
    pub fn begin_drop(&self, file: DroppedFile) -> DecodeTicket {
        lock(&self.coordinator).begin_load(file)
    }

    /// Feed a decode result for the load started with `generation`.
    pub fn complete_decode(
        &self,
        generation: u64,
        decoded: Result<ImageSource>,
    ) -> Result<CoordinatorState> {
        let (outcome, updates) = {
            let mut coordinator = lock(&self.coordinator);
            let applied = match decoded {
                Ok(image) => {
                    let params = self.preferences.snapshot();
                    coordinator.decode_succeeded(generation, image, &params).map(|_| ())
                }
                Err(e @ Error::DecodeFailure(_)) => {
                    coordinator.decode_failed(generation, e);
                    Ok(())
                }
                Err(other) => {
                    let e = Error::DecodeFailure(other.to_string());
                    coordinator.decode_failed(generation, e);
                    Ok(())
                }
            };
            let state = coordinator.state();
            (applied.map(|_| state), coordinator.take_display_updates())
        };
        deliver(&*self.display, updates);
        outcome
    }

    /// Encode the current surface for download.
    pub fn export(&self) -> Result<ExportedImage> {
        let coordinator = lock(&self.coordinator);
        let surface = coordinator.surface().ok_or(Error::NoActiveImage)?;
        let meta = coordinator.active_file().ok_or(Error::NoActiveImage)?;
        export_surface(&surface, meta, &self.config.export_prefix)
    }

    /// Drop the current image and restore the configured preferences.
    pub fn reset(&self) {
        let updates = {
            let mut coordinator = lock(&self.coordinator);
            coordinator.reset();
            coordinator.take_display_updates()
        };
        deliver(&*self.display, updates);
        self.preferences.replace(self.config.render_parameters());
    }
}

impl Drop for GridWidget {
    fn drop(&mut self) {
        self.preferences.unsubscribe(self.subscription);
    }
}
