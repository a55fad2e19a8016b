use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};

use raincast_core::{
    Config, Coordinates, LocationResolver, OpenMeteoGeocoder, OpenMeteoSource, RainfallModel,
    WeatherFeaturePipeline,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "raincast", version, about = "Live rainfall prediction dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a location, fetch current weather, and predict precipitation.
    ///
    /// With no location flags, prompts interactively for an input mode.
    Predict {
        /// City name to geocode, letters and spaces only.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        /// Latitude in [-90, 90].
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Longitude in [-180, 180].
        #[arg(long, requires = "lat")]
        lon: Option<f64>,

        /// Model artifact path, overriding the configured one.
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Store the model path used by `predict`.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Predict {
                city,
                lat,
                lon,
                model,
            } => predict(city, lat, lon, model).await,
            Command::Configure => configure(),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current = config
        .model_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let path = Text::new("Path to trained model:")
        .with_initial_value(&current)
        .prompt()
        .context("Failed to read model path")?;

    config.set_model_path(PathBuf::from(path.trim()));
    config.save()?;

    println!("Saved config to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn predict(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    model: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let model_path = match model {
        Some(path) => path,
        None => config.model_path()?.clone(),
    };
    let model = RainfallModel::load(&model_path)?;

    let geocoder = match &config.geocoding_url {
        Some(url) => OpenMeteoGeocoder::with_base_url(url.clone()),
        None => OpenMeteoGeocoder::new(),
    };
    let resolver = LocationResolver::new(Box::new(geocoder));

    let source = match &config.forecast_url {
        Some(url) => OpenMeteoSource::with_base_url(url.clone()),
        None => OpenMeteoSource::new(),
    };
    let pipeline = WeatherFeaturePipeline::new(Box::new(source), Arc::new(model));

    let coordinates = match (city, lat, lon) {
        (Some(city), _, _) => resolver.resolve_by_name(&city).await?,
        (None, Some(lat), Some(lon)) => resolver.resolve_by_coordinates(lat, lon)?,
        _ => prompt_for_location(&resolver).await?,
    };

    let report = pipeline.run(coordinates).await?;
    render::print_report(&report);

    Ok(())
}

/// Interactive location entry, mirroring the dashboard's input modes.
async fn prompt_for_location(resolver: &LocationResolver) -> anyhow::Result<Coordinates> {
    const CITY: &str = "City name";
    const COORDINATES: &str = "Coordinates";

    let mode = Select::new("Enter location by:", vec![CITY, COORDINATES])
        .prompt()
        .context("Failed to read input mode")?;

    if mode == CITY {
        let name = Text::new("City (e.g. Bengaluru):")
            .prompt()
            .context("Failed to read city name")?;
        Ok(resolver.resolve_by_name(&name).await?)
    } else {
        let lat = CustomType::<f64>::new("Latitude:")
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .prompt()
            .context("Failed to read longitude")?;
        Ok(resolver.resolve_by_coordinates(lat, lon)?)
    }
}
