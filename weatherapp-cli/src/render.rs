//! Plain-text rendering of weather results.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Write;
use weatherapp_core::{CurrentConditions, DailyForecast, WeatherReport};

pub fn report<Tz: TimeZone>(report: &WeatherReport, icon_base: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = current(&report.current, icon_base, tz);

    out.push_str("\n3-Day Forecast\n");
    if report.daily.is_empty() {
        out.push_str("  (no forecast available)\n");
    }
    for day in &report.daily {
        out.push_str(&forecast_line(day, tz));
        out.push('\n');
    }
    out
}

pub fn current<Tz: TimeZone>(c: &CurrentConditions, icon_base: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{}", c.display_name());
    let _ = writeln!(out, "  {}°C  {}", celsius(c.temperature_c), c.condition.description);
    let _ = writeln!(out, "  Feels like  {}°C", celsius(c.feels_like_c));
    let _ = writeln!(out, "  Humidity    {}%", c.humidity_pct);
    let _ = writeln!(out, "  Wind        {} m/s", c.wind_speed_mps);
    let _ = writeln!(
        out,
        "  Sun         {} / {}",
        clock(c.sunrise, tz),
        clock(c.sunset, tz)
    );
    if let Some(url) = c.condition.icon_url(icon_base) {
        let _ = writeln!(out, "  Icon        {url}");
    }
    out
}

/// One search hit, e.g. `London, GB | light rain | 12°C`.
pub fn search_hit(c: &CurrentConditions) -> String {
    format!(
        "{} | {} | {}°C",
        c.display_name(),
        c.condition.description,
        celsius(c.temperature_c)
    )
}

fn forecast_line<Tz: TimeZone>(day: &DailyForecast, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "  {}  {:>4}°  {:<20} {:>3}% precip",
        day.timestamp.with_timezone(tz).format("%a"),
        celsius(day.temperature_c),
        day.condition.description,
        (day.precipitation_probability * 100.0).round()
    )
}

/// Whole degrees, with -0 shown as 0.
fn celsius(t: f64) -> f64 {
    t.round() + 0.0
}

fn clock<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%H:%M").to_string()
}
