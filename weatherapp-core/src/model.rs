use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Weather condition as reported upstream (code, group, text and icon id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            id: 0,
            main: "Unknown".to_string(),
            description: "Unknown".to_string(),
            icon: String::new(),
        }
    }

    /// Icon image URL, e.g. `{base}/10d@2x.png`.
    pub fn icon_url(&self, base: &str) -> Option<String> {
        if self.icon.is_empty() {
            return None;
        }
        Some(format!("{}/{}@2x.png", base.trim_end_matches('/'), self.icon))
    }
}

/// Snapshot of current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_id: u64,
    pub name: String,
    pub country: String,
    pub coord: Coordinate,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub pressure_hpa: u32,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub wind_deg: u16,
    pub cloudiness_pct: u8,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub condition: Condition,
}

impl CurrentConditions {
    /// Coordinate handed to a forecast load when this result is selected.
    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }

    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub dt_txt: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: Condition,
    /// Probability of precipitation, 0.0..=1.0.
    pub precipitation_probability: f64,
}

/// The first sample of a future calendar day.
pub type DailyForecast = ForecastPoint;

/// Result of one successful load cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_url_uses_two_x_variant() {
        let c = Condition {
            id: 500,
            main: "Rain".into(),
            description: "light rain".into(),
            icon: "10d".into(),
        };

        assert_eq!(
            c.icon_url("https://openweathermap.org/img/wn/").as_deref(),
            Some("https://openweathermap.org/img/wn/10d@2x.png")
        );
    }

    #[test]
    fn unknown_condition_has_no_icon() {
        assert_eq!(Condition::unknown().icon_url("https://example.test"), None);
    }

    #[test]
    fn coordinate_display_is_four_decimals() {
        assert_eq!(Coordinate::new(51.5074, -0.1278).to_string(), "51.5074, -0.1278");
    }
}
