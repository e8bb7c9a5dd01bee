use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    WeatherError,
    config::ClientConfig,
    error::truncate_body,
    forecast::{FORECAST_SAMPLE_COUNT, normalize_daily},
    model::{Condition, Coordinate, CurrentConditions, DailyForecast, ForecastPoint},
};

use super::WeatherApi;

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: ClientConfig,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("appid", self.config.api_key.as_str()));
        query.push(("units", self.config.units));

        debug!(endpoint, ?params, "sending OpenWeather request");

        let res = self
            .http
            .get(self.url(endpoint))
            .query(&query)
            .send()
            .await
            .map_err(|source| {
                warn!(endpoint, error = %source, "OpenWeather request failed");
                WeatherError::Transport { endpoint, source }
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Transport { endpoint, source })?;

        if !status.is_success() {
            warn!(endpoint, %status, "OpenWeather returned an error status");
            return Err(WeatherError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| {
            warn!(endpoint, error = %source, "OpenWeather response did not parse");
            WeatherError::Decode { endpoint, source }
        })
    }

    /// Raw 3-hour samples, in upstream order.
    pub async fn forecast_samples(&self, coord: Coordinate) -> Result<Vec<ForecastPoint>, WeatherError> {
        let parsed: OwForecastResponse = self
            .get(
                FORECAST_ENDPOINT,
                &[
                    ("lat", coord.latitude.to_string()),
                    ("lon", coord.longitude.to_string()),
                    ("cnt", FORECAST_SAMPLE_COUNT.to_string()),
                ],
            )
            .await?;

        Ok(parsed.list.into_iter().map(ForecastPoint::from).collect())
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current_by_coordinates(&self, coord: Coordinate) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self
            .get(
                CURRENT_ENDPOINT,
                &[
                    ("lat", coord.latitude.to_string()),
                    ("lon", coord.longitude.to_string()),
                ],
            )
            .await?;

        Ok(parsed.into())
    }

    async fn forecast(&self, coord: Coordinate) -> Result<Vec<DailyForecast>, WeatherError> {
        let samples = self.forecast_samples(coord).await?;
        Ok(normalize_daily(&samples, &Local::now(), self.config.day_matching))
    }

    async fn search_by_name(&self, query: &str) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self
            .get(CURRENT_ENDPOINT, &[("q", query.to_string())])
            .await?;

        Ok(parsed.into())
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize, Default)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize, Default)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: u64,
    name: String,
    coord: OwCoord,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    #[serde(default)]
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: Vec<OwWeather>) -> Condition {
    weather
        .into_iter()
        .next()
        .map(|w| Condition {
            id: w.id,
            main: w.main,
            description: w.description,
            icon: w.icon,
        })
        .unwrap_or_else(Condition::unknown)
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(|| {
        warn!(ts, "timestamp out of range, using current time");
        Utc::now()
    })
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(r: OwCurrentResponse) -> Self {
        CurrentConditions {
            location_id: r.id,
            name: r.name,
            country: r.sys.country,
            coord: Coordinate::new(r.coord.lat, r.coord.lon),
            observed_at: unix_to_utc(r.dt),
            temperature_c: r.main.temp,
            feels_like_c: r.main.feels_like,
            temp_min_c: r.main.temp_min.unwrap_or(r.main.temp),
            temp_max_c: r.main.temp_max.unwrap_or(r.main.temp),
            pressure_hpa: r.main.pressure,
            humidity_pct: r.main.humidity,
            wind_speed_mps: r.wind.speed,
            wind_deg: r.wind.deg,
            cloudiness_pct: r.clouds.all,
            sunrise: unix_to_utc(r.sys.sunrise),
            sunset: unix_to_utc(r.sys.sunset),
            condition: first_condition(r.weather),
        }
    }
}

impl From<OwForecastEntry> for ForecastPoint {
    fn from(e: OwForecastEntry) -> Self {
        ForecastPoint {
            timestamp: unix_to_utc(e.dt),
            dt_txt: e.dt_txt,
            temperature_c: e.main.temp,
            feels_like_c: e.main.feels_like,
            temp_min_c: e.main.temp_min.unwrap_or(e.main.temp),
            temp_max_c: e.main.temp_max.unwrap_or(e.main.temp),
            humidity_pct: e.main.humidity,
            wind_speed_mps: e.wind.speed,
            condition: first_condition(e.weather),
            precipitation_probability: e.pop,
        }
    }
}
