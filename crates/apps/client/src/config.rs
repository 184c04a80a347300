//! Session settings from `GEOBOARD_*` environment variables.

use std::env;

use foundation::math::LatLng;
use layers::DEFAULT_CLOSE_DELAY_MS;
use scene::{DEFAULT_CELL_SIZE_DEG, ViewportConfig};
use store::RestStore;
use store::rest::DEFAULT_BUCKET;

use crate::error::ClientError;

pub const DEFAULT_CENTER: LatLng = LatLng::new(37.5665, 126.978);
pub const DEFAULT_ZOOM: f64 = 12.0;
/// Zoom used once the user's own location is known.
pub const LOCATED_ZOOM: f64 = 14.0;
pub const DEFAULT_TOP_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub bucket: String,
    pub top_limit: usize,
    pub cell_size_deg: f64,
    pub popup_close_ms: u64,
    pub resize_delay_ms: u64,
    pub panel_height_fraction: f64,
    /// Position reported by the host; `None` means geolocation is unavailable.
    pub location: Option<LatLng>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: None,
            bucket: DEFAULT_BUCKET.to_string(),
            top_limit: DEFAULT_TOP_LIMIT,
            cell_size_deg: DEFAULT_CELL_SIZE_DEG,
            popup_close_ms: DEFAULT_CLOSE_DELAY_MS,
            resize_delay_ms: ViewportConfig::default().resize_delay_ms,
            panel_height_fraction: ViewportConfig::default().panel_height_fraction,
            location: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let lat = parsed::<f64, _>(&lookup, "GEOBOARD_LAT");
        let lng = parsed::<f64, _>(&lookup, "GEOBOARD_LNG");
        Self {
            store_url: non_empty(&lookup, "GEOBOARD_STORE_URL"),
            store_key: non_empty(&lookup, "GEOBOARD_STORE_KEY"),
            bucket: non_empty(&lookup, "GEOBOARD_BUCKET").unwrap_or(d.bucket),
            top_limit: parsed(&lookup, "GEOBOARD_TOP_LIMIT").unwrap_or(d.top_limit),
            cell_size_deg: parsed(&lookup, "GEOBOARD_CELL_SIZE_DEG")
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(d.cell_size_deg),
            popup_close_ms: parsed(&lookup, "GEOBOARD_POPUP_CLOSE_MS").unwrap_or(d.popup_close_ms),
            resize_delay_ms: parsed(&lookup, "GEOBOARD_RESIZE_DELAY_MS")
                .unwrap_or(d.resize_delay_ms),
            panel_height_fraction: parsed(&lookup, "GEOBOARD_PANEL_HEIGHT")
                .filter(|v: &f64| *v > 0.0 && *v <= 1.0)
                .unwrap_or(d.panel_height_fraction),
            location: match (lat, lng) {
                (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)).filter(|p| p.is_finite()),
                _ => None,
            },
        }
    }

    pub fn viewport(&self) -> ViewportConfig {
        ViewportConfig {
            panel_height_fraction: self.panel_height_fraction,
            resize_delay_ms: self.resize_delay_ms,
        }
    }

    /// Builds the HTTP store. Missing credentials fail here, before any request.
    pub fn rest_store(&self) -> Result<RestStore, ClientError> {
        let url = self
            .store_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("GEOBOARD_STORE_URL is not set".to_string()))?;
        let key = self
            .store_key
            .as_deref()
            .ok_or_else(|| ClientError::Config("GEOBOARD_STORE_KEY is not set".to_string()))?;
        RestStore::new(url, key, &self.bucket).map_err(|e| ClientError::Config(e.to_string()))
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
