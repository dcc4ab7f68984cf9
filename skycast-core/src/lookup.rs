//! Resolve-then-fetch as one operation with a stage-tagged error.

use crate::{
    error::LookupError,
    model::{Place, UnitPreference, WeatherPayload},
    provider::{Geolocator, LocationResolver, WeatherFetcher},
};

pub async fn lookup_by_name(
    resolver: &dyn LocationResolver,
    fetcher: &dyn WeatherFetcher,
    query: &str,
    unit: UnitPreference,
) -> Result<(Place, WeatherPayload), LookupError> {
    let place = resolver.resolve_by_name(query).await?;
    let payload = fetcher.fetch_weather(place.coordinates(), unit).await?;
    Ok((place, payload))
}

pub async fn lookup_by_geolocation(
    geolocator: &dyn Geolocator,
    fetcher: &dyn WeatherFetcher,
    unit: UnitPreference,
) -> Result<(Place, WeatherPayload), LookupError> {
    let place = Place::my_location(geolocator.locate().await?);
    let payload = fetcher.fetch_weather(place.coordinates(), unit).await?;
    Ok((place, payload))
}
