use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::{Coordinates, UnitPreference};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_IP_LOCATION_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Service endpoints. Overridable so the widget can be pointed at a mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub ip_location_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            ip_location_url: DEFAULT_IP_LOCATION_URL.to_string(),
        }
    }
}

/// Where "use my location" gets its coordinates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// No location capability; requests fail as unsupported.
    #[default]
    Off,
    /// Approximate position from the public IP address.
    Ip,
    /// Coordinates stored in this file.
    Fixed,
}

impl GeolocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeolocationMode::Off => "off",
            GeolocationMode::Ip => "ip",
            GeolocationMode::Fixed => "fixed",
        }
    }

    pub const fn all() -> &'static [GeolocationMode] {
        &[GeolocationMode::Off, GeolocationMode::Ip, GeolocationMode::Fixed]
    }
}

impl std::fmt::Display for GeolocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub mode: GeolocationMode,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeolocationConfig {
    /// Stored coordinates, if both halves are present.
    pub fn fixed_coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_unit = "celsius"
///
/// [geolocation]
/// mode = "fixed"
/// latitude = 52.52
/// longitude = 13.41
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unit the widget starts in.
    pub default_unit: UnitPreference,

    /// Language passed to the geocoding service.
    pub language: String,

    pub endpoints: Endpoints,

    pub geolocation: GeolocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_unit: UnitPreference::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            endpoints: Endpoints::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Switch to fixed geolocation at the given coordinates.
    pub fn set_fixed_location(&mut self, coordinates: Coordinates) {
        self.geolocation = GeolocationConfig {
            mode: GeolocationMode::Fixed,
            latitude: Some(coordinates.lat),
            longitude: Some(coordinates.lon),
        };
    }

    fn validate(&self) -> Result<()> {
        if self.geolocation.mode == GeolocationMode::Fixed {
            let coords = self.geolocation.fixed_coordinates().ok_or_else(|| {
                anyhow!(
                    "Geolocation mode 'fixed' needs both latitude and longitude.\n\
                     Hint: run `skycast configure` to set them."
                )
            })?;
            if !(-90.0..=90.0).contains(&coords.lat) || !(-180.0..=180.0).contains(&coords.lon) {
                return Err(anyhow!(
                    "Fixed location ({}, {}) is outside valid latitude/longitude ranges",
                    coords.lat,
                    coords.lon
                ));
            }
        }
        Ok(())
    }
}
