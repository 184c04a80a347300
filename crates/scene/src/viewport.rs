use foundation::math::LatLng;
use foundation::time::Time;
use tracing::debug;

use crate::surface::MapView;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportConfig {
    /// Map height while the detail panel is showing.
    pub panel_height_fraction: f64,
    /// Delay between a resize and the recenter that depends on it.
    pub resize_delay_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            panel_height_fraction: 0.5,
            resize_delay_ms: 100,
        }
    }
}

/// View captured when the detail panel opened.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SavedView {
    pub center: LatLng,
    pub zoom: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Step {
    Recenter,
    Restore,
}

/// Shrinks the map while a post is selected and puts it back afterwards.
///
/// Both directions are two-step: resize now, recenter after
/// `resize_delay_ms` once the widget has been told its size changed. Only the
/// latest pending step survives, so a close that arrives before the open's
/// recenter still restores the view captured on open.
#[derive(Debug)]
pub struct ViewportController {
    config: ViewportConfig,
    saved: Option<SavedView>,
    pending: Option<(Time, Step)>,
    height_fraction: f64,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            saved: None,
            pending: None,
            height_fraction: 1.0,
        }
    }

    pub fn saved(&self) -> Option<SavedView> {
        self.saved
    }

    pub fn height_fraction(&self) -> f64 {
        self.height_fraction
    }

    pub fn next_deadline(&self) -> Option<Time> {
        self.pending.map(|(at, _)| at)
    }

    /// Selection went from none to some.
    pub fn on_selected<M: MapView + ?Sized>(&mut self, map: &mut M, now: Time) {
        // A restore that has not run yet means the map still shows the shrunken
        // view; the original capture is the one to keep.
        if self.saved.is_none() {
            self.saved = Some(SavedView {
                center: map.center(),
                zoom: map.zoom(),
            });
        }
        self.height_fraction = self.config.panel_height_fraction;
        map.set_height_fraction(self.height_fraction);
        self.pending = Some((now.after(self.config.resize_delay_ms), Step::Recenter));
    }

    /// Selection went from some to none.
    pub fn on_cleared<M: MapView + ?Sized>(&mut self, map: &mut M, now: Time) {
        if self.saved.is_none() {
            return;
        }
        self.height_fraction = 1.0;
        map.set_height_fraction(self.height_fraction);
        self.pending = Some((now.after(self.config.resize_delay_ms), Step::Restore));
    }

    /// Runs the deferred step if it is due. Returns `true` if it ran.
    pub fn advance<M: MapView + ?Sized>(&mut self, map: &mut M, now: Time) -> bool {
        let Some((at, step)) = self.pending else {
            return false;
        };
        if at > now {
            return false;
        }
        self.pending = None;
        map.invalidate_size();

        let saved = match step {
            Step::Recenter => self.saved,
            Step::Restore => self.saved.take(),
        };
        if let Some(view) = saved {
            debug!(?step, lat = view.center.lat, lng = view.center.lng, zoom = view.zoom, "recentering map");
            map.set_view(view.center, view.zoom);
        }
        true
    }
}
