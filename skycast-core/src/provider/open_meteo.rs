use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    Config,
    error::{LocationError, WeatherError},
    model::{Coordinates, CurrentConditions, DailyForecast, Place, UnitPreference, WeatherPayload},
};

use super::{LocationResolver, USER_AGENT, WeatherFetcher, truncate_body};

const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,relative_humidity_2m,wind_speed_10m,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";
const FORECAST_DAYS: &str = "7";

/// Open-Meteo geocoding + forecast client. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    geocoding_url: String,
    forecast_url: String,
    language: String,
    http: Client,
}

impl OpenMeteo {
    pub fn new(
        geocoding_url: String,
        forecast_url: String,
        language: String,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { geocoding_url, forecast_url, language, http })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.endpoints.geocoding_url.clone(),
            config.endpoints.forecast_url.clone(),
            config.language.clone(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Vec<OmGeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResult {
    name: String,
    #[serde(default)]
    country_code: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: String,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    timezone: String,
    current: OmCurrent,
    daily: OmDaily,
}

#[async_trait]
impl LocationResolver for OpenMeteo {
    async fn resolve_by_name(&self, query: &str) -> Result<Place, LocationError> {
        tracing::debug!(query, "geocoding");

        let res = self
            .http
            .get(&self.geocoding_url)
            .query(&[
                ("name", query),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| LocationError::Network(format!("geocoding request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LocationError::Network(format!("geocoding body unreadable: {e}")))?;

        if !status.is_success() {
            return Err(LocationError::Network(format!(
                "geocoding failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OmGeocodingResponse = serde_json::from_str(&body)
            .map_err(|e| LocationError::Parse(format!("geocoding JSON invalid: {e}")))?;

        let best = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound { query: query.to_string() })?;

        let place = Place {
            name: best.name,
            country: best.country_code.unwrap_or_default(),
            lat: best.latitude,
            lon: best.longitude,
        };

        tracing::info!(
            place = %place.display_name(),
            lat = place.lat,
            lon = place.lon,
            "resolved place"
        );
        Ok(place)
    }
}

#[async_trait]
impl WeatherFetcher for OpenMeteo {
    async fn fetch_weather(
        &self,
        coordinates: Coordinates,
        unit: UnitPreference,
    ) -> Result<WeatherPayload, WeatherError> {
        tracing::debug!(lat = coordinates.lat, lon = coordinates.lon, %unit, "fetching forecast");

        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("current", CURRENT_FIELDS),
                ("daily", DAILY_FIELDS),
                ("temperature_unit", unit.temperature_param()),
                ("wind_speed_unit", unit.wind_speed_param()),
                ("timezone", "auto"),
                ("forecast_days", FORECAST_DAYS),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(format!("forecast request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Network(format!("forecast body unreadable: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::Network(format!(
                "forecast failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("forecast JSON invalid: {e}")))?;

        into_payload(parsed, unit)
    }
}

fn into_payload(
    parsed: OmForecastResponse,
    unit: UnitPreference,
) -> Result<WeatherPayload, WeatherError> {
    let current = CurrentConditions {
        temperature: parsed.current.temperature_2m,
        apparent_temperature: parsed.current.apparent_temperature,
        humidity: parsed.current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
        wind_speed: parsed.current.wind_speed_10m,
        weather_code: parsed.current.weather_code,
        observed_at: parse_local_time(&parsed.current.time)?,
    };

    let dates = parsed
        .daily
        .time
        .iter()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| WeatherError::Parse(format!("bad daily date '{d}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let daily = DailyForecast::new(
        dates,
        parsed.daily.weather_code,
        parsed.daily.temperature_2m_max,
        parsed.daily.temperature_2m_min,
    )?;

    Ok(WeatherPayload { current, daily, unit, timezone: parsed.timezone })
}

/// Open-Meteo returns local times without offset, minute precision.
fn parse_local_time(s: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| WeatherError::Parse(format!("bad observation time '{s}': {e}")))
}
