//! Location capture bracketing each accepted scan.
//!
//! The gate waits for a [`LocationProvider`] under a timeout and an explicit
//! cancellation token. It has no side effects of its own: the caller only
//! appends a scan once [`GeolocationGate::capture`] returns a point, so a
//! cancelled or failed capture leaves nothing behind.

use std::time::Duration;

use patrol_core::location::{GeoPoint, LocationError, LocationProvider};
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;

#[derive(Debug, Clone)]
pub struct GeolocationGate {
    timeout: Duration,
}

impl GeolocationGate {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Wait for a position fix.
    ///
    /// Returns [`ScanError::Cancelled`] if `cancel` fires first,
    /// [`LocationError::Timeout`] if the provider does not answer in time,
    /// and [`LocationError::PositionUnavailable`] for coordinates that are
    /// not a real position.
    pub async fn capture(
        &self,
        provider: &dyn LocationProvider,
        cancel: &CancellationToken,
    ) -> Result<GeoPoint, ScanError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            result = tokio::time::timeout(self.timeout, provider.current_position()) => {
                match result {
                    Err(_elapsed) => Err(LocationError::Timeout.into()),
                    Ok(Err(e)) => Err(e.into()),
                    Ok(Ok(point)) if !point.is_valid() => {
                        tracing::warn!(?point, "Provider returned an invalid position");
                        Err(LocationError::PositionUnavailable.into())
                    }
                    Ok(Ok(point)) => Ok(point),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
