use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    WeatherError,
    model::{Coordinate, CurrentConditions, DailyForecast},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Read-only lookups against the weather API.
///
/// Calls are independent of each other and may run concurrently.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn current_by_coordinates(&self, coord: Coordinate) -> Result<CurrentConditions, WeatherError>;

    /// Forecast for `coord`, already reduced to at most three upcoming days.
    async fn forecast(&self, coord: Coordinate) -> Result<Vec<DailyForecast>, WeatherError>;

    async fn search_by_name(&self, query: &str) -> Result<CurrentConditions, WeatherError>;
}
