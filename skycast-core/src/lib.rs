//! Core library for the `skycast` weather widget.
//!
//! This crate defines:
//! - Place resolution (city search via geocoding, device geolocation)
//! - Forecast fetching with server-side unit conversion
//! - The weather code table and the text renderer
//! - The widget state machine tying them together
//! - Configuration handling
//!
//! It is used by `skycast-cli`, but can also be embedded by other front ends.

pub mod conditions;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod render;
pub mod widget;

pub use conditions::{Condition, describe};
pub use config::{Config, GeolocationMode};
pub use error::{LocationError, LookupError, WeatherError};
pub use model::{
    Coordinates, CurrentConditions, DailyForecast, Place, UnitPreference, WeatherPayload,
};
pub use provider::{Geolocator, LocationResolver, WeatherFetcher};
pub use widget::{Transition, Widget, WidgetState};
