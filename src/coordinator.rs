//! Render coordinator: the state machine between drops, decodes, and renders.
//!
//! ```text
//!  Idle ──drop──▶ Loading ──decode ok──▶ Ready ──prefs changed──▶ Ready
//!   ▲               │  ▲                   │
//!   └──decode fail──┘  └───────drop────────┘
//! ```
//!
//! Every drop bumps a decode generation. A completion carrying an older
//! generation is dropped on the floor, so a slow decode of an earlier file
//! can never overwrite a newer one.
//!
//! The coordinator never calls the display itself. Each transition queues
//! `DisplayUpdate`s; the owner drains them with `take_display_updates` and
//! delivers them once it has let go of the coordinator.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::display::DisplayUpdate;
use crate::preferences::RenderParameters;
use crate::rendering::{self, DrawingSurface};
use crate::source::{DroppedFile, FileMeta, ImageSource};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No image loaded
    Idle,
    /// Waiting for the decode issued with `generation`
    Loading { generation: u64 },
    /// Image decoded and rendered
    Ready,
}

/// A decode request handed out by `begin_load`.
#[derive(Debug, Clone)]
pub struct DecodeTicket {
    pub generation: u64,
    pub file: DroppedFile,
}

struct Session {
    meta: FileMeta,
    image: ImageSource,
    surface: Arc<DrawingSurface>,
}

pub struct RenderCoordinator {
    state: CoordinatorState,
    generation: u64,
    pending: Option<FileMeta>,
    session: Option<Session>,
    last_error: Option<Error>,
    outbox: Vec<DisplayUpdate>,
}

impl RenderCoordinator {
    pub fn new() -> Self {
        Self {
            state: CoordinatorState::Idle,
            generation: 0,
            pending: None,
            session: None,
            last_error: None,
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The error from the most recent failed decode, cleared by the next drop.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn surface(&self) -> Option<Arc<DrawingSurface>> {
        self.session.as_ref().map(|s| s.surface.clone())
    }

    pub fn active_file(&self) -> Option<&FileMeta> {
        self.session.as_ref().map(|s| &s.meta)
    }

    /// Drain the display calls queued since the last drain, oldest first.
    pub fn take_display_updates(&mut self) -> Vec<DisplayUpdate> {
        std::mem::take(&mut self.outbox)
    }

    /// A file was dropped: forget the current image and wait for a new decode.
    pub fn begin_load(&mut self, file: DroppedFile) -> DecodeTicket {
        self.generation += 1;
        self.session = None;
        self.last_error = None;
        self.pending = Some(file.meta.clone());
        self.state = CoordinatorState::Loading {
            generation: self.generation,
        };
        debug!("loading {} (generation {})", file.meta.name, self.generation);
        DecodeTicket {
            generation: self.generation,
            file,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state == CoordinatorState::Loading { generation }
    }

    /// Apply a successful decode. Returns `Ok(false)` if the completion is stale.
    ///
    /// A render failure leaves the coordinator `Idle` and is returned as-is.
    pub fn decode_succeeded(
        &mut self,
        generation: u64,
        image: ImageSource,
        params: &RenderParameters,
    ) -> Result<bool> {
        if !self.is_current(generation) {
            debug!(
                "discarding stale decode (generation {} != {})",
                generation, self.generation
            );
            return Ok(false);
        }
        let meta = self.pending.take().unwrap_or_default();

        let surface = match rendering::render(&image, params) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                self.state = CoordinatorState::Idle;
                self.outbox.push(DisplayUpdate::Clear);
                return Err(e);
            }
        };

        info!("{} ready ({}x{})", meta.name, image.width(), image.height());
        self.outbox
            .push(DisplayUpdate::Present(surface.clone(), meta.clone()));
        self.session = Some(Session { meta, image, surface });
        self.state = CoordinatorState::Ready;
        Ok(true)
    }

    /// Apply a failed decode: back to `Idle` with the error shown to the user.
    /// Returns `false` if the completion is stale.
    pub fn decode_failed(&mut self, generation: u64, err: Error) -> bool {
        if !self.is_current(generation) {
            debug!("discarding stale decode failure (generation {})", generation);
            return false;
        }
        let name = self.pending.take().map(|m| m.name).unwrap_or_default();
        warn!("could not decode {}: {}", name, err);
        self.state = CoordinatorState::Idle;
        self.outbox.push(DisplayUpdate::Clear);
        self.outbox.push(DisplayUpdate::Error(err.to_string()));
        self.last_error = Some(err);
        true
    }

    /// Re-render the stored image with new parameters.
    ///
    /// Fails with `NoActiveImage` when nothing is loaded.
    pub fn rerender(&mut self, params: &RenderParameters) -> Result<Arc<DrawingSurface>> {
        let session = match (self.state, self.session.as_mut()) {
            (CoordinatorState::Ready, Some(session)) => session,
            _ => return Err(Error::NoActiveImage),
        };
        let surface = Arc::new(rendering::render(&session.image, params)?);
        session.surface = surface.clone();
        self.outbox
            .push(DisplayUpdate::Present(surface.clone(), session.meta.clone()));
        Ok(surface)
    }

    /// Preference-change hook. With no image loaded this does nothing and
    /// returns `Ok(false)`.
    pub fn preferences_changed(&mut self, params: &RenderParameters) -> Result<bool> {
        match self.rerender(params) {
            Ok(_) => Ok(true),
            Err(Error::NoActiveImage) => {
                debug!("preferences changed with no image loaded");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Back to `Idle`; any in-flight decode becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.session = None;
        self.pending = None;
        self.last_error = None;
        self.state = CoordinatorState::Idle;
        self.outbox.push(DisplayUpdate::Clear);
    }
}

impl Default for RenderCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
