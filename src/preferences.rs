//! User preferences for the grid overlay, with change subscriptions.
//!
//! The UI controls call the setters; anything that wants to react (the
//! render coordinator, mostly) registers a callback with `subscribe`.
//! A setter that actually changes the stored value fires each subscriber
//! exactly once with the new snapshot. Setting the current value again is
//! silent.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::Result;

/// Parameters captured for a single render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderParameters {
    pub column_count: u32,
    pub stroke_color: Color,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            column_count: 4,
            stroke_color: Color::BLACK,
        }
    }
}

/// Upper bound on the column count unless configured otherwise.
pub const DEFAULT_MAX_COLUMNS: u32 = 256;

pub type PreferencesHandler = Arc<dyn Fn(&RenderParameters) + Send + Sync>;

/// Handle returned by `subscribe`; pass it to `unsubscribe` to stop notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    params: RenderParameters,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, PreferencesHandler)>,
}

pub struct PreferencesState {
    inner: Mutex<Inner>,
    max_columns: u32,
}

impl PreferencesState {
    pub fn new(initial: RenderParameters) -> Self {
        Self::with_max_columns(initial, DEFAULT_MAX_COLUMNS)
    }

    /// Column counts are kept in `1..=max_columns`.
    pub fn with_max_columns(initial: RenderParameters, max_columns: u32) -> Self {
        let max_columns = max_columns.max(1);
        let params = RenderParameters {
            column_count: initial.column_count.clamp(1, max_columns),
            ..initial
        };
        Self {
            inner: Mutex::new(Inner {
                params,
                next_id: 1,
                subscribers: Vec::new(),
            }),
            max_columns,
        }
    }

    pub fn max_columns(&self) -> u32 {
        self.max_columns
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking subscriber never runs under this lock, so poisoning
        // cannot leave the parameters half-written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current parameters, copied out.
    pub fn snapshot(&self) -> RenderParameters {
        self.lock().params
    }

    pub fn subscribe<F>(&self, cb: F) -> SubscriptionId
    where
        F: Fn(&RenderParameters) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(cb)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    /// Floors `n` and clamps it to `1..=max_columns` (NaN becomes 1).
    /// Returns the stored value.
    pub fn set_column_count(&self, n: f64) -> u32 {
        let columns = if n.is_nan() || n < 1.0 {
            1
        } else if n >= self.max_columns as f64 {
            self.max_columns
        } else {
            n.floor() as u32
        };
        self.update(|p| p.column_count = columns);
        columns
    }

    pub fn set_stroke_color(&self, color: Color) {
        self.update(|p| p.stroke_color = color);
    }

    /// Parse and apply a colour input value such as `#ff0000`.
    pub fn set_stroke_color_str(&self, value: &str) -> Result<Color> {
        let color = Color::parse_hex(value)?;
        self.set_stroke_color(color);
        Ok(color)
    }

    /// Replace every parameter at once; notifies once if anything changed.
    pub fn replace(&self, params: RenderParameters) {
        let params = RenderParameters {
            column_count: params.column_count.clamp(1, self.max_columns),
            ..params
        };
        self.update(|p| *p = params);
    }

    fn update(&self, apply: impl FnOnce(&mut RenderParameters)) {
        let (snapshot, handlers) = {
            let mut inner = self.lock();
            let before = inner.params;
            apply(&mut inner.params);
            if inner.params == before {
                return;
            }
            let handlers: Vec<PreferencesHandler> =
                inner.subscribers.iter().map(|(_, h)| h.clone()).collect();
            (inner.params, handlers)
        };

        // Handlers run without the lock held so they may read or set preferences.
        for handler in handlers {
            handler(&snapshot);
        }
    }
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self::new(RenderParameters::default())
    }
}

impl std::fmt::Debug for PreferencesState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("PreferencesState")
            .field("params", &inner.params)
            .field("max_columns", &self.max_columns)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(prefs: &PreferencesState) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        prefs.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn defaults() {
        let p = PreferencesState::default().snapshot();
        assert_eq!(p.column_count, 4);
        assert_eq!(p.stroke_color, Color::BLACK);
    }

    #[test]
    fn zero_clamps_to_one_and_notifies_once() {
        let prefs = PreferencesState::default();
        let count = counting(&prefs);
        assert_eq!(prefs.set_column_count(0.0), 1);
        assert_eq!(prefs.snapshot().column_count, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fractional_values_are_floored() {
        let prefs = PreferencesState::default();
        assert_eq!(prefs.set_column_count(3.7), 3);
        assert_eq!(prefs.snapshot().column_count, 3);
        assert_eq!(prefs.set_column_count(-12.0), 1);
        assert_eq!(prefs.set_column_count(f64::NAN), 1);
    }

    #[test]
    fn huge_values_stop_at_the_column_bound() {
        let prefs = PreferencesState::default();
        assert_eq!(prefs.set_column_count(1e20), DEFAULT_MAX_COLUMNS);
        assert_eq!(prefs.set_column_count(f64::INFINITY), DEFAULT_MAX_COLUMNS);
        assert_eq!(prefs.snapshot().column_count, DEFAULT_MAX_COLUMNS);

        let narrow = PreferencesState::with_max_columns(RenderParameters::default(), 3);
        assert_eq!(narrow.snapshot().column_count, 3);
        assert_eq!(narrow.set_column_count(10.0), 3);
        narrow.replace(RenderParameters { column_count: 99, stroke_color: Color::WHITE });
        assert_eq!(narrow.snapshot().column_count, 3);
    }

    #[test]
    fn unchanged_value_does_not_notify() {
        let prefs = PreferencesState::default();
        let count = counting(&prefs);
        prefs.set_column_count(4.0);
        prefs.set_column_count(4.9);
        prefs.set_stroke_color(Color::BLACK);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        prefs.set_stroke_color(Color::WHITE);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_see_new_snapshot() {
        let prefs = PreferencesState::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        prefs.subscribe(move |p| s.lock().unwrap().push(*p));
        prefs.set_stroke_color_str("#00ff00").unwrap();
        prefs.set_column_count(6.0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].stroke_color, Color::rgb(0, 255, 0));
        assert_eq!(seen[1].column_count, 6);
    }

    #[test]
    fn bad_color_string_leaves_state_alone() {
        let prefs = PreferencesState::default();
        let count = counting(&prefs);
        assert!(prefs.set_stroke_color_str("red-ish").is_err());
        assert_eq!(prefs.snapshot().stroke_color, Color::BLACK);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let prefs = PreferencesState::default();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let id = prefs.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        prefs.set_column_count(2.0);
        assert!(prefs.unsubscribe(id));
        assert!(!prefs.unsubscribe(id));
        prefs.set_column_count(3.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replace_notifies_once_and_clamps() {
        let prefs = PreferencesState::default();
        let count = counting(&prefs);
        prefs.replace(RenderParameters { column_count: 0, stroke_color: Color::WHITE });
        assert_eq!(prefs.snapshot().column_count, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
