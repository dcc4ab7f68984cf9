//! WMO weather interpretation codes, as reported by Open-Meteo.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

/// Label shown for codes missing from the table.
pub const FALLBACK_LABEL: &str = "—";

/// Icon shown for codes missing from the table.
pub const FALLBACK_ICON: &str = "🌡️";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionCodeEntry {
    pub code: i32,
    pub label: &'static str,
    pub icon: &'static str,
}

/// `{label, icon}` pair returned by [`describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub label: &'static str,
    pub icon: &'static str,
}

impl Condition {
    pub const FALLBACK: Condition = Condition { label: FALLBACK_LABEL, icon: FALLBACK_ICON };
}

const fn entry(code: i32, label: &'static str, icon: &'static str) -> ConditionCodeEntry {
    ConditionCodeEntry { code, label, icon }
}

pub static CONDITION_CODES: &[ConditionCodeEntry] = &[
    entry(0, "Clear", "☀️"),
    entry(1, "Mainly clear", "🌤️"),
    entry(2, "Partly cloudy", "⛅"),
    entry(3, "Overcast", "☁️"),
    entry(45, "Fog", "🌫️"),
    entry(48, "Rime fog", "🌫️"),
    entry(51, "Light drizzle", "🌦️"),
    entry(53, "Drizzle", "🌦️"),
    entry(55, "Dense drizzle", "🌧️"),
    entry(56, "Freezing drizzle", "🌧️"),
    entry(57, "Dense freezing drizzle", "🌧️"),
    entry(61, "Light rain", "🌦️"),
    entry(63, "Rain", "🌧️"),
    entry(65, "Heavy rain", "🌧️"),
    entry(66, "Freezing rain", "🌧️"),
    entry(67, "Heavy freezing rain", "🌧️"),
    entry(71, "Light snow", "🌨️"),
    entry(73, "Snow", "🌨️"),
    entry(75, "Heavy snow", "❄️"),
    entry(77, "Snow grains", "🌨️"),
    entry(80, "Light showers", "🌦️"),
    entry(81, "Showers", "🌧️"),
    entry(82, "Violent showers", "⛈️"),
    entry(85, "Snow showers", "🌨️"),
    entry(86, "Heavy snow showers", "❄️"),
    entry(95, "Thunderstorm", "⛈️"),
    entry(96, "Thunderstorm with hail", "⛈️"),
    entry(99, "Thunderstorm with heavy hail", "⛈️"),
];

/// Label and icon for a weather code. Total: unknown codes get
/// [`Condition::FALLBACK`].
pub fn describe(code: i32) -> Condition {
    CONDITION_CODES
        .iter()
        .find(|e| e.code == code)
        .map(|e| Condition { label: e.label, icon: e.icon })
        .unwrap_or(Condition::FALLBACK)
}
