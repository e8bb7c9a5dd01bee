//! Location resolution: explicit coordinates or a single fix from the host.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::debug;

use crate::{WeatherError, config::DeviceConfig, model::Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Host platform geolocation capability.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// Ask for foreground location access.
    async fn request_permission(&self) -> PermissionStatus;

    /// One position reading; no tracking.
    async fn current_position(&self) -> Result<Coordinate, WeatherError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolverState {
    AwaitingPermission,
    Resolved(Coordinate),
}

/// Single-use resolver; build a fresh one for every load.
#[derive(Debug)]
pub struct LocationResolver<'a, L: LocationProvider + ?Sized> {
    provider: &'a L,
    state: ResolverState,
}

impl<'a, L: LocationProvider + ?Sized> LocationResolver<'a, L> {
    pub fn new(provider: &'a L) -> Self {
        Self {
            provider,
            state: ResolverState::AwaitingPermission,
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Explicit coordinates short-circuit to `Resolved` without touching the
    /// provider. Otherwise permission is requested, then one fix is taken.
    pub async fn resolve(&mut self, explicit: Option<Coordinate>) -> Result<Coordinate, WeatherError> {
        if let ResolverState::Resolved(coord) = self.state {
            return Ok(coord);
        }

        if let Some(coord) = explicit {
            debug!(%coord, "using explicit coordinates");
            self.state = ResolverState::Resolved(coord);
            return Ok(coord);
        }

        if self.provider.request_permission().await == PermissionStatus::Denied {
            debug!("location permission denied");
            return Err(WeatherError::PermissionDenied);
        }

        let coord = self.provider.current_position().await?;
        debug!(%coord, "resolved device position");
        self.state = ResolverState::Resolved(coord);
        Ok(coord)
    }
}

/// Location source backed by the `[device]` section of the config.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDevice {
    device: DeviceConfig,
}

impl ConfiguredDevice {
    pub fn new(device: DeviceConfig) -> Self {
        Self { device }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredDevice {
    async fn request_permission(&self) -> PermissionStatus {
        if self.device.location_access {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self) -> Result<Coordinate, WeatherError> {
        match (self.device.latitude, self.device.longitude) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(WeatherError::LocationUnavailable(
                "device latitude/longitude are not configured".to_string(),
            )),
        }
    }
}
