//! A map surface without a screen.
//!
//! Records what a real map widget would be asked to draw, so sessions can run
//! from the CLI and from tests.

use foundation::math::LatLng;
use layers::{MarkerCanvas, MarkerDescriptor, PopupContent};
use scene::{GroupId, MapView};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HeadlessMap {
    center: LatLng,
    zoom: f64,
    height_fraction: f64,
    invalidations: usize,
    generation: u32,
    markers: Vec<MarkerDescriptor>,
    popup: Option<PopupContent>,
}

impl HeadlessMap {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            height_fraction: 1.0,
            invalidations: 0,
            generation: 0,
            markers: Vec::new(),
            popup: None,
        }
    }

    pub fn height_fraction(&self) -> f64 {
        self.height_fraction
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        &self.markers
    }

    /// The popup currently shown, if any.
    pub fn popup(&self) -> Option<&PopupContent> {
        self.popup.as_ref()
    }

    /// Simulates the user panning or zooming.
    pub fn pan_to(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }
}

impl MapView for HeadlessMap {
    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        debug!(lat = center.lat, lng = center.lng, zoom, "set view");
        self.center = center;
        self.zoom = zoom;
    }

    fn set_height_fraction(&mut self, fraction: f64) {
        self.height_fraction = fraction;
    }

    fn invalidate_size(&mut self) {
        self.invalidations += 1;
    }
}

impl MarkerCanvas for HeadlessMap {
    fn replace_markers(&mut self, generation: u32, markers: &[MarkerDescriptor]) {
        debug!(generation, count = markers.len(), "replace markers");
        self.generation = generation;
        self.markers = markers.to_vec();
        self.popup = None;
    }

    fn open_popup(&mut self, content: &PopupContent) {
        self.popup = Some(content.clone());
    }

    fn close_popup(&mut self, group: GroupId) {
        if self.popup.as_ref().is_some_and(|p| p.group == group) {
            self.popup = None;
        }
    }
}
