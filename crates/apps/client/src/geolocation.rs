use foundation::math::LatLng;
use store::BoxFuture;

use crate::error::ClientError;

/// One-shot position lookup provided by the host.
pub trait Geolocator: Send + Sync {
    fn current_position(&self) -> BoxFuture<'_, Result<LatLng, ClientError>>;
}

/// Reports a position fixed at startup, or fails when there is none.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<LatLng>);

impl Geolocator for FixedLocation {
    fn current_position(&self) -> BoxFuture<'_, Result<LatLng, ClientError>> {
        let position = self.0;
        Box::pin(async move {
            position.ok_or_else(|| {
                ClientError::Geolocation("no position configured (GEOBOARD_LAT/GEOBOARD_LNG)".into())
            })
        })
    }
}
