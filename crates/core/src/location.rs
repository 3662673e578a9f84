//! Geolocation types and the location provider capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A WGS84 position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Why a position fix could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LocationError {
    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Timed out waiting for a position fix")]
    Timeout,
}

impl LocationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LocationError::PositionUnavailable => "LOCATION_UNAVAILABLE",
            LocationError::PermissionDenied => "LOCATION_PERMISSION_DENIED",
            LocationError::Timeout => "LOCATION_TIMEOUT",
        }
    }
}

/// The platform's source of position fixes.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint, LocationError>;
}

/// A provider that answers with a position (or failure) reported by the
/// device that performed the scan.
#[derive(Debug, Clone, Copy)]
pub struct ReportedLocation(pub Result<GeoPoint, LocationError>);

#[async_trait]
impl LocationProvider for ReportedLocation {
    async fn current_position(&self) -> Result<GeoPoint, LocationError> {
        self.0
    }
}
