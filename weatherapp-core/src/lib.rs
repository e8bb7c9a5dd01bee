//! Core library for the `weatherapp` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and forecast normalization
//! - Location resolution (explicit coordinates or a device fix)
//! - The load/search flows and the view state the front end renders
//!
//! It is used by `weatherapp-cli`, but can also be reused by other binaries or services.

pub mod app;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location;
pub mod model;
pub mod provider;

pub use app::{ErrorKind, LoadError, SearchScreen, WeatherApp, WeatherScreen};
pub use config::{ClientConfig, Config, DeviceConfig};
pub use error::WeatherError;
pub use forecast::{DayMatching, normalize_daily};
pub use location::{ConfiguredDevice, LocationProvider, LocationResolver, PermissionStatus};
pub use model::{Condition, Coordinate, CurrentConditions, DailyForecast, ForecastPoint, WeatherReport};
pub use provider::{OpenWeatherClient, WeatherApi};
