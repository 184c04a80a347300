/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;

/// Geographic position in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Arithmetic mean of `points`, or `None` for an empty input.
    pub fn mean<I>(points: I) -> Option<LatLng>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut n = 0usize;
        let mut lat = 0.0;
        let mut lng = 0.0;
        for p in points {
            lat += p.lat;
            lng += p.lng;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        Some(LatLng::new(lat / n as f64, lng / n as f64))
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Length of one degree of latitude on the equatorial sphere, in meters.
pub fn meters_per_degree() -> f64 {
    WGS84_A * std::f64::consts::PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::{LatLng, meters_per_degree};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn mean_of_points() {
        let m = LatLng::mean([LatLng::new(1.0, 10.0), LatLng::new(3.0, 20.0)]).unwrap();
        assert_close(m.lat, 2.0, 1e-12);
        assert_close(m.lng, 15.0, 1e-12);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert!(LatLng::mean(std::iter::empty()).is_none());
    }

    #[test]
    fn ten_thousandth_degree_is_about_eleven_meters() {
        assert_close(1e-4 * meters_per_degree(), 11.13, 0.01);
    }
}
