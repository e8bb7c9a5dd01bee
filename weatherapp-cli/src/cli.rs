use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use tracing::debug;
use weatherapp_core::{
    Config, ConfiguredDevice, Coordinate, OpenWeatherClient, SearchScreen, WeatherApp,
    WeatherScreen,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherapp", version, about = "Current weather and a 3-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key and device location.
    Configure,

    /// Show weather for explicit coordinates, or for the device location.
    Show {
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Look a city up by name, then optionally show its forecast.
    Search {
        query: String,

        /// Show the forecast for the match without asking.
        #[arg(long, short)]
        yes: bool,

        #[arg(long)]
        json: bool,
    },
}

type App = WeatherApp<OpenWeatherClient, ConfiguredDevice>;

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, json } => {
                let config = Config::load()?;
                let app = build_app(&config)?;
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                show(&app, &config, explicit, json).await
            }
            Command::Search { query, yes, json } => {
                let config = Config::load()?;
                let app = build_app(&config)?;
                search(&app, &config, &query, yes, json).await
            }
        }
    }
}

fn build_app(config: &Config) -> Result<App> {
    let client = OpenWeatherClient::new(config.client_config()?);
    let device = ConfiguredDevice::new(config.device.clone());
    Ok(WeatherApp::new(client, device))
}

async fn show(app: &App, config: &Config, explicit: Option<Coordinate>, json: bool) -> Result<()> {
    let mut screen = WeatherScreen::default();
    let ticket = screen.begin_load();
    let outcome = app.load_weather(explicit).await;
    if let Err(err) = &outcome {
        debug!(kind = ?err.kind, ?explicit, "weather load failed");
    }
    screen.commit(ticket, outcome);

    if let Some(message) = &screen.error {
        bail!("{message}");
    }
    let Some(report) = &screen.report else {
        bail!("{}", weatherapp_core::app::LOAD_FAILED);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render::report(report, config.icon_base_url(), &Local));
    }
    Ok(())
}

async fn search(app: &App, config: &Config, query: &str, yes: bool, json: bool) -> Result<()> {
    let mut screen = SearchScreen::default();
    if !screen.submit(app, query).await {
        bail!("Search query is empty.");
    }

    if let Some(message) = &screen.error {
        debug!(query, "search returned no match");
        bail!("{message}");
    }

    for hit in &screen.results {
        if json {
            println!("{}", serde_json::to_string_pretty(hit)?);
        } else {
            println!("{}", render::search_hit(hit));
        }
    }

    let Some(hit) = screen.results.first() else {
        return Ok(());
    };

    let proceed = yes
        || Confirm::new(&format!("Show the forecast for {}?", hit.display_name()))
            .with_default(true)
            .prompt()
            .context("Failed to read confirmation")?;

    if !proceed {
        return Ok(());
    }

    match screen.select(0) {
        Some(coord) => show(app, config, Some(coord), json).await,
        None => Ok(()),
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.device.location_access = Confirm::new("Allow access to the device location?")
        .with_default(config.device.location_access)
        .prompt()
        .context("Failed to read location access choice")?;

    if config.device.location_access {
        let mut latitude = CustomType::<f64>::new("Device latitude:")
            .with_error_message("Enter a number between -90 and 90");
        if let Some(lat) = config.device.latitude {
            latitude = latitude.with_default(lat);
        }
        let latitude = latitude.prompt().context("Failed to read latitude")?;

        let mut longitude = CustomType::<f64>::new("Device longitude:")
            .with_error_message("Enter a number between -180 and 180");
        if let Some(lon) = config.device.longitude {
            longitude = longitude.with_default(lon);
        }
        let longitude = longitude.prompt().context("Failed to read longitude")?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            bail!("Coordinates out of range: {latitude}, {longitude}");
        }
        config.device.latitude = Some(latitude);
        config.device.longitude = Some(longitude);
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
