use thiserror::Error;

/// Failures of the Location Resolver and geolocation sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("No results for that city")]
    NotFound { query: String },

    #[error("Location lookup failed: {0}")]
    Network(String),

    #[error("Location data could not be read: {0}")]
    Parse(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Geolocation is not supported on this device")]
    Unsupported,
}

/// Failures of the Weather Fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Network(String),

    #[error("Weather data could not be read: {0}")]
    Parse(String),
}

/// Error of the composed resolve-then-fetch operation, tagged with the stage
/// that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Resolve(#[from] LocationError),

    #[error(transparent)]
    Forecast(#[from] WeatherError),
}

impl LookupError {
    pub fn stage(&self) -> &'static str {
        match self {
            LookupError::Resolve(_) => "resolve",
            LookupError::Forecast(_) => "forecast",
        }
    }
}
