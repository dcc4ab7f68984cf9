//! Plain-text view of a [`WidgetState`].
//!
//! Values are rounded here and nowhere else, so rendering the same payload
//! twice yields the same text.

use std::fmt::Write as _;

use crate::{
    conditions::describe,
    model::{UnitPreference, WeatherPayload},
    widget::WidgetState,
};

pub const FORECAST_DAYS: usize = 5;
pub const LOADING_TEXT: &str = "Loading…";
pub const EMPTY_HINT: &str = "Search for a city or use your location.";
pub const ERROR_MARKER: &str = "⚠";
pub const WIND_LABEL_MPH: &str = "mph";
pub const WIND_LABEL_KMH: &str = "km/h";

pub fn temperature_suffix(unit: UnitPreference) -> &'static str {
    match unit {
        UnitPreference::Fahrenheit => "°F",
        UnitPreference::Celsius => "°C",
    }
}

pub fn wind_label(unit: UnitPreference) -> &'static str {
    match unit {
        UnitPreference::Fahrenheit => WIND_LABEL_MPH,
        UnitPreference::Celsius => WIND_LABEL_KMH,
    }
}

/// Nearest integer. Going through `i64` also drops the sign of `-0.0`.
fn round(value: f64) -> i64 {
    value.round() as i64
}

pub fn format_temperature(value: f64, unit: UnitPreference) -> String {
    format!("{}{}", round(value), temperature_suffix(unit))
}

pub fn render(state: &WidgetState) -> String {
    let mut out = String::new();

    if let Some(place) = &state.place {
        let _ = writeln!(out, "{}", place.display_name());
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{ERROR_MARKER} {error}");
    }

    if state.loading {
        let _ = writeln!(out, "{LOADING_TEXT}");
        return out;
    }

    match &state.payload {
        Some(payload) => render_payload(&mut out, payload),
        None if state.error.is_none() => {
            let _ = writeln!(out, "{EMPTY_HINT}");
        }
        None => {}
    }

    out
}

fn render_payload(out: &mut String, payload: &WeatherPayload) {
    let unit = payload.unit;
    let current = &payload.current;
    let condition = describe(current.weather_code);

    let _ = writeln!(out, "{}  {}", condition.icon, condition.label);
    let _ = writeln!(
        out,
        "{}  (feels like {})",
        format_temperature(current.temperature, unit),
        format_temperature(current.apparent_temperature, unit),
    );
    let _ = writeln!(
        out,
        "Humidity {}%   Wind {} {}",
        current.humidity,
        round(current.wind_speed),
        wind_label(unit),
    );

    let observed = current.observed_at.format("%Y-%m-%d %H:%M");
    if payload.timezone.is_empty() {
        let _ = writeln!(out, "Observed {observed}");
    } else {
        let _ = writeln!(out, "Observed {observed} ({})", payload.timezone);
    }

    if payload.daily.is_empty() {
        return;
    }

    out.push('\n');
    for day in payload.daily.days().take(FORECAST_DAYS) {
        let condition = describe(day.weather_code);
        let _ = writeln!(
            out,
            "{} {}  {}  {:<24} {} / {}",
            day.date.format("%a"),
            day.date.format("%m/%d"),
            condition.icon,
            condition.label,
            format_temperature(day.temp_max, unit),
            format_temperature(day.temp_min, unit),
        );
    }
}
