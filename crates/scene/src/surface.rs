use foundation::math::LatLng;

/// Viewport half of the map-rendering collaborator.
///
/// The map widget owns panning, zooming and tiles. The core only reads the
/// current view and asks for resizes and recenters.
pub trait MapView {
    fn center(&self) -> LatLng;
    fn zoom(&self) -> f64;
    fn set_view(&mut self, center: LatLng, zoom: f64);
    /// Container height as a fraction of the full screen.
    fn set_height_fraction(&mut self, fraction: f64);
    /// Tells the widget its container changed size.
    fn invalidate_size(&mut self);
}
