use crate::{
    Config,
    config::GeolocationMode,
    error::{LocationError, WeatherError},
    model::{Coordinates, Place, UnitPreference, WeatherPayload},
    provider::geolocation::{
        ConsentGate, FixedGeolocator, IpGeolocator, LocationConsent, Unsupported,
    },
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod geolocation;
pub mod open_meteo;

pub use open_meteo::OpenMeteo;

pub const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

/// Turns free text into the best matching place.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve_by_name(&self, query: &str) -> Result<Place, LocationError>;
}

/// Fetches current conditions and the daily forecast for a coordinate pair.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        coordinates: Coordinates,
        unit: UnitPreference,
    ) -> Result<WeatherPayload, WeatherError>;
}

/// Platform location capability.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Construct the configured geolocation source, guarded by `consent`.
///
/// Mode `off` never asks for consent: there is nothing to grant access to.
pub fn geolocator_from_config<C>(
    config: &Config,
    consent: C,
) -> anyhow::Result<Box<dyn Geolocator>>
where
    C: LocationConsent + 'static,
{
    let boxed: Box<dyn Geolocator> = match config.geolocation.mode {
        GeolocationMode::Off => Box::new(Unsupported),
        GeolocationMode::Fixed => {
            let coordinates = config.geolocation.fixed_coordinates().ok_or_else(|| {
                anyhow::anyhow!(
                    "Geolocation mode 'fixed' has no coordinates configured.\n\
                     Hint: run `skycast configure` to set them."
                )
            })?;
            Box::new(ConsentGate::new(FixedGeolocator::new(coordinates), consent))
        }
        GeolocationMode::Ip => Box::new(ConsentGate::new(
            IpGeolocator::new(config.endpoints.ip_location_url.clone())?,
            consent,
        )),
    };

    Ok(boxed)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
