//! Load and search flows, plus the state containers the front end renders.
//!
//! Every failure is collapsed into a [`LoadError`] carrying one of three fixed
//! user-facing messages; the structured cause is only logged.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    WeatherError,
    location::{LocationProvider, LocationResolver},
    model::{Coordinate, CurrentConditions, WeatherReport},
    provider::WeatherApi,
};

pub const LOAD_FAILED: &str = "Failed to load weather data";
pub const PERMISSION_DENIED: &str = "Permission to access location was denied";
pub const LOCATION_NOT_FOUND: &str = "Location not found. Try another search.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Permission,
    Upstream,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadError {
    pub kind: ErrorKind,
    pub message: &'static str,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for LoadError {}

impl LoadError {
    fn from_load(err: &WeatherError) -> Self {
        debug!(error = %err, "weather load failed");
        match err {
            WeatherError::PermissionDenied => LoadError {
                kind: ErrorKind::Permission,
                message: PERMISSION_DENIED,
            },
            _ => LoadError {
                kind: ErrorKind::Upstream,
                message: LOAD_FAILED,
            },
        }
    }

    fn from_search(err: &WeatherError) -> Self {
        debug!(error = %err, "location search failed");
        let kind = if err.is_not_found() {
            ErrorKind::NotFound
        } else {
            ErrorKind::Upstream
        };
        LoadError {
            kind,
            message: LOCATION_NOT_FOUND,
        }
    }
}

/// Trimmed query, or `None` when there is nothing to search for.
pub fn normalize_query(query: &str) -> Option<&str> {
    let q = query.trim();
    (!q.is_empty()).then_some(q)
}

/// Wires a weather API and a location source into the two user flows.
#[derive(Debug)]
pub struct WeatherApp<A, L> {
    api: A,
    location: L,
}

impl<A: WeatherApi, L: LocationProvider> WeatherApp<A, L> {
    pub fn new(api: A, location: L) -> Self {
        Self { api, location }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve a coordinate, then fetch current conditions and the daily
    /// forecast, in that order.
    pub async fn load_weather(&self, explicit: Option<Coordinate>) -> Result<WeatherReport, LoadError> {
        self.try_load(explicit).await.map_err(|e| LoadError::from_load(&e))
    }

    async fn try_load(&self, explicit: Option<Coordinate>) -> Result<WeatherReport, WeatherError> {
        let coord = LocationResolver::new(&self.location).resolve(explicit).await?;

        let current = self.api.current_by_coordinates(coord).await?;
        let daily = self.api.forecast(coord).await?;

        info!(
            location = %current.display_name(),
            %coord,
            days = daily.len(),
            "weather loaded"
        );

        Ok(WeatherReport { current, daily })
    }

    pub async fn search(&self, query: &str) -> Result<CurrentConditions, LoadError> {
        self.api
            .search_by_name(query)
            .await
            .map_err(|e| LoadError::from_search(&e))
    }
}

/// Issued by [`WeatherScreen::begin_load`]; identifies one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// State of the main weather view.
///
/// Only the most recently started load may commit; an older load that
/// finishes late is dropped.
#[derive(Debug, Default, Clone, Serialize)]
pub struct WeatherScreen {
    #[serde(skip)]
    generation: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub report: Option<WeatherReport>,
}

impl WeatherScreen {
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket(self.generation)
    }

    /// Returns `false` when the ticket is stale and nothing changed.
    pub fn commit(&mut self, ticket: LoadTicket, outcome: Result<WeatherReport, LoadError>) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale load");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(report) => {
                self.error = None;
                self.report = Some(report);
            }
            Err(err) => {
                self.error = Some(err.message.to_string());
            }
        }
        true
    }
}

/// State of the search view.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SearchScreen {
    pub results: Vec<CurrentConditions>,
    pub error: Option<String>,
}

impl SearchScreen {
    /// Run a search through `app` and apply its outcome. Blank queries are
    /// ignored and return `false`.
    pub async fn submit<A: WeatherApi, L: LocationProvider>(
        &mut self,
        app: &WeatherApp<A, L>,
        query: &str,
    ) -> bool {
        let Some(query) = normalize_query(query) else {
            return false;
        };

        self.error = None;
        match app.search(query).await {
            Ok(found) => self.results = vec![found],
            Err(err) => {
                self.results.clear();
                self.error = Some(err.message.to_string());
            }
        }
        true
    }

    /// Coordinate of the `index`th result, to hand to [`WeatherApp::load_weather`].
    pub fn select(&self, index: usize) -> Option<Coordinate> {
        self.results.get(index).map(CurrentConditions::coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::PermissionStatus;
    use crate::model::{Condition, DailyForecast};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    fn conditions(name: &str, coord: Coordinate) -> CurrentConditions {
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        CurrentConditions {
            location_id: 1,
            name: name.to_string(),
            country: "GB".to_string(),
            coord,
            observed_at: t,
            temperature_c: 12.0,
            feels_like_c: 11.0,
            temp_min_c: 10.0,
            temp_max_c: 13.0,
            pressure_hpa: 1010,
            humidity_pct: 80,
            wind_speed_mps: 5.0,
            wind_deg: 200,
            cloudiness_pct: 40,
            sunrise: t,
            sunset: t,
            condition: Condition::unknown(),
        }
    }

    #[derive(Debug, Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        fail_with: Option<u16>,
    }

    impl FakeApi {
        fn failing(status: u16) -> Self {
            Self {
                fail_with: Some(status),
                ..Self::default()
            }
        }

        fn record(&self, call: String) -> Result<(), WeatherError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_with {
                Some(code) => Err(WeatherError::Status {
                    endpoint: "weather",
                    status: StatusCode::from_u16(code).unwrap(),
                    body: String::new(),
                }),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherApi for FakeApi {
        async fn current_by_coordinates(&self, coord: Coordinate) -> Result<CurrentConditions, WeatherError> {
            self.record(format!("current {} {}", coord.latitude, coord.longitude))?;
            Ok(conditions("Here", coord))
        }

        async fn forecast(&self, coord: Coordinate) -> Result<Vec<DailyForecast>, WeatherError> {
            self.record(format!("forecast {} {}", coord.latitude, coord.longitude))?;
            Ok(Vec::new())
        }

        async fn search_by_name(&self, query: &str) -> Result<CurrentConditions, WeatherError> {
            self.record(format!("search {query}"))?;
            Ok(conditions(query, Coordinate::new(51.5074, -0.1278)))
        }
    }

    #[derive(Debug)]
    struct FakeDevice(PermissionStatus);

    #[async_trait]
    impl LocationProvider for FakeDevice {
        async fn request_permission(&self) -> PermissionStatus {
            self.0
        }

        async fn current_position(&self) -> Result<Coordinate, WeatherError> {
            Ok(Coordinate::new(10.0, 20.0))
        }
    }

    #[tokio::test]
    async fn permission_denied_makes_no_network_call() {
        let app = WeatherApp::new(FakeApi::default(), FakeDevice(PermissionStatus::Denied));

        let err = app.load_weather(None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Permission);
        assert_eq!(err.message, PERMISSION_DENIED);
        assert!(app.api().calls().is_empty());
    }

    #[tokio::test]
    async fn device_position_feeds_both_fetches_in_order() {
        let app = WeatherApp::new(FakeApi::default(), FakeDevice(PermissionStatus::Granted));

        let report = app.load_weather(None).await.unwrap();

        assert_eq!(report.current.coord, Coordinate::new(10.0, 20.0));
        assert_eq!(app.api().calls(), vec!["current 10 20", "forecast 10 20"]);
    }

    #[tokio::test]
    async fn explicit_coordinates_bypass_permission() {
        let app = WeatherApp::new(FakeApi::default(), FakeDevice(PermissionStatus::Denied));

        app.load_weather(Some(Coordinate::new(51.5, -0.12))).await.unwrap();

        assert_eq!(app.api().calls(), vec!["current 51.5 -0.12", "forecast 51.5 -0.12"]);
    }

    #[tokio::test]
    async fn upstream_failure_stops_before_forecast() {
        let app = WeatherApp::new(FakeApi::failing(500), FakeDevice(PermissionStatus::Granted));

        let err = app.load_weather(None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Upstream);
        assert_eq!(err.message, LOAD_FAILED);
        assert_eq!(app.api().calls(), vec!["current 10 20"]);
    }

    #[tokio::test]
    async fn search_404_is_not_found() {
        let app = WeatherApp::new(FakeApi::failing(404), FakeDevice(PermissionStatus::Denied));

        let err = app.search("Zzzzznotacity").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, LOCATION_NOT_FOUND);
    }

    #[tokio::test]
    async fn search_other_failures_are_upstream() {
        let app = WeatherApp::new(FakeApi::failing(401), FakeDevice(PermissionStatus::Denied));

        let err = app.search("London").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Upstream);
        assert_eq!(err.message, LOCATION_NOT_FOUND);
    }

    #[tokio::test]
    async fn search_screen_ignores_blank_queries() {
        let app = WeatherApp::new(FakeApi::default(), FakeDevice(PermissionStatus::Denied));
        let mut screen = SearchScreen::default();

        assert!(!screen.submit(&app, "   ").await);
        assert!(app.api().calls().is_empty());
    }

    #[tokio::test]
    async fn search_screen_clears_results_on_failure() {
        let ok = WeatherApp::new(FakeApi::default(), FakeDevice(PermissionStatus::Denied));
        let mut screen = SearchScreen::default();
        assert!(screen.submit(&ok, " London ").await);
        assert_eq!(screen.results.len(), 1);
        assert_eq!(ok.api().calls(), vec!["search London"]);
        assert_eq!(screen.select(0), Some(Coordinate::new(51.5074, -0.1278)));

        let failing = WeatherApp::new(FakeApi::failing(404), FakeDevice(PermissionStatus::Denied));
        screen.submit(&failing, "Zzzzznotacity").await;
        assert!(screen.results.is_empty());
        assert_eq!(screen.error.as_deref(), Some(LOCATION_NOT_FOUND));
        assert_eq!(screen.select(0), None);
    }

    #[test]
    fn stale_load_cannot_overwrite_newer_one() {
        let mut screen = WeatherScreen::default();
        let coord = Coordinate::new(1.0, 2.0);

        let first = screen.begin_load();
        let second = screen.begin_load();

        let newer = WeatherReport {
            current: conditions("Newer", coord),
            daily: Vec::new(),
        };
        assert!(screen.commit(second, Ok(newer)));
        assert!(!screen.loading);

        let older = WeatherReport {
            current: conditions("Older", coord),
            daily: Vec::new(),
        };
        assert!(!screen.commit(first, Ok(older)));

        assert_eq!(screen.report.as_ref().map(|r| r.current.name.as_str()), Some("Newer"));
    }

    #[test]
    fn failed_load_keeps_previous_report() {
        let mut screen = WeatherScreen::default();
        let ticket = screen.begin_load();
        screen.commit(
            ticket,
            Ok(WeatherReport {
                current: conditions("Kept", Coordinate::new(0.0, 0.0)),
                daily: Vec::new(),
            }),
        );

        let ticket = screen.begin_load();
        assert!(screen.error.is_none());
        let applied = screen.commit(
            ticket,
            Err(LoadError {
                kind: ErrorKind::Upstream,
                message: LOAD_FAILED,
            }),
        );

        assert!(applied);
        assert_eq!(screen.error.as_deref(), Some(LOAD_FAILED));
        assert!(screen.report.is_some());
    }

    #[test]
    fn normalize_query_trims() {
        assert_eq!(normalize_query("  Paris "), Some("Paris"));
        assert_eq!(normalize_query("\t"), None);
    }
}
