//! WMO weather interpretation codes mapped to unicode glyphs and text
//! descriptions. Kept as a flat table so new codes are a one-line addition.

pub const UNKNOWN_GLYPH: &str = "❓";
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

const TABLE: &[(u16, &str, &str)] = &[
    (0, "☀️", "Clear sky"),
    (1, "🌤️", "Mainly clear"),
    (2, "⛅", "Partly cloudy"),
    (3, "☁️", "Overcast"),
    (45, "🌫️", "Fog"),
    (48, "🌫️", "Depositing rime fog"),
    (51, "🌧️", "Light drizzle"),
    (53, "🌧️", "Moderate drizzle"),
    (55, "🌧️", "Dense drizzle"),
    (56, "🌨️", "Light freezing drizzle"),
    (57, "🌨️", "Dense freezing drizzle"),
    (61, "🌦️", "Slight rain"),
    (63, "🌧️", "Moderate rain"),
    (65, "🌧️", "Heavy rain"),
    (66, "🌨️", "Light freezing rain"),
    (67, "🌨️", "Heavy freezing rain"),
    (71, "❄️", "Slight snow fall"),
    (73, "❄️", "Moderate snow fall"),
    (75, "❄️", "Heavy snow fall"),
    (77, "❄️", "Snow grains"),
    (80, "🌦️", "Slight rain showers"),
    (81, "🌧️", "Moderate rain showers"),
    (82, "🌧️", "Violent rain showers"),
    (85, "🌨️", "Slight snow showers"),
    (86, "🌨️", "Heavy snow showers"),
    (95, "⛈️", "Thunderstorm"),
    (96, "⛈️", "Thunderstorm with slight hail"),
    (99, "⛈️", "Thunderstorm with heavy hail"),
];

fn lookup(code: u16) -> Option<&'static (u16, &'static str, &'static str)> {
    TABLE.iter().find(|(c, _, _)| *c == code)
}

/// Glyph for a weather code; unknown codes get [`UNKNOWN_GLYPH`].
pub fn glyph(code: u16) -> &'static str {
    lookup(code).map_or(UNKNOWN_GLYPH, |&(_, glyph, _)| glyph)
}

/// Description for a weather code; unknown codes get [`UNKNOWN_DESCRIPTION`].
pub fn description(code: u16) -> &'static str {
    lookup(code).map_or(UNKNOWN_DESCRIPTION, |&(_, _, description)| description)
}
