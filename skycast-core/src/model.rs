use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Display name used for places obtained from device geolocation.
pub const MY_LOCATION_NAME: &str = "My location";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A resolved place. Replaced wholesale on every new search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    /// Country code, empty for geolocated places.
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    /// Place built from device coordinates; reverse geocoding is not performed.
    pub fn my_location(coordinates: Coordinates) -> Self {
        Self {
            name: MY_LOCATION_NAME.to_string(),
            country: String::new(),
            lat: coordinates.lat,
            lon: coordinates.lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// "Orlando, US", or just the name when no country is known.
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Temperature and wind-speed unit family requested from the forecast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Fahrenheit,
    Celsius,
}

impl UnitPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitPreference::Fahrenheit => "fahrenheit",
            UnitPreference::Celsius => "celsius",
        }
    }

    pub const fn all() -> &'static [UnitPreference] {
        &[UnitPreference::Fahrenheit, UnitPreference::Celsius]
    }

    /// Value of the forecast `temperature_unit` parameter.
    pub fn temperature_param(&self) -> &'static str {
        self.as_str()
    }

    /// Value of the forecast `wind_speed_unit` parameter.
    pub fn wind_speed_param(&self) -> &'static str {
        match self {
            UnitPreference::Fahrenheit => "mph",
            UnitPreference::Celsius => "kmh",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UnitPreference::Fahrenheit => UnitPreference::Celsius,
            UnitPreference::Celsius => UnitPreference::Fahrenheit,
        }
    }
}

impl std::fmt::Display for UnitPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitPreference {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "fahrenheit" | "f" | "imperial" => Ok(UnitPreference::Fahrenheit),
            "celsius" | "c" | "metric" => Ok(UnitPreference::Celsius),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: fahrenheit, celsius."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    pub wind_speed: f64,
    pub weather_code: i32,
    /// Local time at the queried location.
    pub observed_at: NaiveDateTime,
}

/// One calendar day of the forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// Daily forecast as parallel sequences; index `i` describes one day.
///
/// The four sequences always have the same length, which is checked on
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    dates: Vec<NaiveDate>,
    weather_codes: Vec<i32>,
    temp_max: Vec<f64>,
    temp_min: Vec<f64>,
}

impl DailyForecast {
    pub fn new(
        dates: Vec<NaiveDate>,
        weather_codes: Vec<i32>,
        temp_max: Vec<f64>,
        temp_min: Vec<f64>,
    ) -> Result<Self, WeatherError> {
        let len = dates.len();
        if weather_codes.len() != len || temp_max.len() != len || temp_min.len() != len {
            return Err(WeatherError::Parse(format!(
                "daily sequences differ in length (dates={}, codes={}, max={}, min={})",
                len,
                weather_codes.len(),
                temp_max.len(),
                temp_min.len(),
            )));
        }

        Ok(Self { dates, weather_codes, temp_max, temp_min })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn weather_codes(&self) -> &[i32] {
        &self.weather_codes
    }

    pub fn temp_max(&self) -> &[f64] {
        &self.temp_max
    }

    pub fn temp_min(&self) -> &[f64] {
        &self.temp_min
    }

    pub fn day(&self, index: usize) -> Option<ForecastDay> {
        Some(ForecastDay {
            date: *self.dates.get(index)?,
            weather_code: *self.weather_codes.get(index)?,
            temp_max: *self.temp_max.get(index)?,
            temp_min: *self.temp_min.get(index)?,
        })
    }

    pub fn days(&self) -> impl Iterator<Item = ForecastDay> + '_ {
        (0..self.len()).filter_map(|i| self.day(i))
    }
}

/// Current conditions plus daily forecast, as returned by one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPayload {
    pub current: CurrentConditions,
    pub daily: DailyForecast,
    /// The unit family the values are expressed in.
    pub unit: UnitPreference,
    /// IANA timezone name the service resolved for the coordinates.
    pub timezone: String,
}
