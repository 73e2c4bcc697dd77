//! Turns a [`WeatherModel`] into the text the tray shell displays: a compact
//! label next to the icon and the dropdown menu lines. Weekend runs in the
//! forecast are framed by blank lines so they stand out visually.

use skytray_core::WeatherModel;

/// Compact label shown next to the tray icon, e.g. `☀️ 72.0°F`.
pub fn tray_label(model: &WeatherModel) -> String {
    format!(
        "{} {:.1}{}",
        model.current_glyph,
        model.current_temperature,
        model.unit.symbol()
    )
}

/// Dropdown lines: location, current conditions, then one line per forecast
/// day. An empty string is a separator row.
pub fn menu_lines(model: &WeatherModel) -> Vec<String> {
    let mut lines = vec![
        format!("Location: {}", model.location_label),
        format!(
            "Current: {} {}, {:.1}{}",
            model.current_glyph,
            model.current_description,
            model.current_temperature,
            model.unit.symbol()
        ),
        String::new(),
    ];

    let mut last_was_weekend = false;
    for day in &model.forecast {
        if day.is_weekend != last_was_weekend {
            lines.push(String::new());
        }
        lines.push(format!(
            "{}: {} {}, {:.1}{} / {:.1}{}",
            day.label,
            day.glyph,
            day.description,
            day.temp_high,
            day.unit.symbol(),
            day.temp_low,
            day.unit.symbol()
        ));
        last_was_weekend = day.is_weekend;
    }
    if last_was_weekend {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use skytray_core::{RawCurrent, RawForecastDay, UnitPreference, WeatherModel};

    fn model(start: &str, days: usize, unit: UnitPreference) -> WeatherModel {
        let start: chrono::NaiveDate = start.parse().expect("valid test date");
        let forecast: Vec<RawForecastDay> = (0..days)
            .map(|i| RawForecastDay {
                date: start + chrono::Duration::days(i as i64),
                weather_code: 0,
                temp_high: 75.0,
                temp_low: 60.0,
            })
            .collect();
        WeatherModel::normalize(
            "Seattle, Washington, US",
            &RawCurrent {
                weather_code: 0,
                temperature: 72.0,
            },
            &forecast,
            unit,
        )
    }

    #[test]
    fn tray_label_has_glyph_and_one_decimal() {
        let model = model("2024-06-03", 1, UnitPreference::Imperial);
        assert_eq!(tray_label(&model), "☀️ 72.0°F");
    }

    #[test]
    fn tray_label_respects_celsius() {
        let model = model("2024-06-03", 1, UnitPreference::Celsius);
        assert_eq!(tray_label(&model), "☀️ 72.0°C");
    }

    #[test]
    fn menu_starts_with_location_and_current() {
        let lines = menu_lines(&model("2024-06-03", 2, UnitPreference::Imperial));
        assert_eq!(lines[0], "Location: Seattle, Washington, US");
        assert_eq!(lines[1], "Current: ☀️ Clear sky, 72.0°F");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Mon, Jun 03: ☀️ Clear sky, 75.0°F / 60.0°F");
    }

    #[test]
    fn weekend_run_is_framed_by_separators() {
        // Thu Jun 06 .. Tue Jun 11: weekend is Jun 08/09.
        let lines = menu_lines(&model("2024-06-06", 6, UnitPreference::Imperial));
        let days: Vec<&str> = lines[3..].iter().map(String::as_str).collect();
        assert_eq!(
            days,
            vec![
                "Thu, Jun 06: ☀️ Clear sky, 75.0°F / 60.0°F",
                "Fri, Jun 07: ☀️ Clear sky, 75.0°F / 60.0°F",
                "",
                "Sat, Jun 08: ☀️ Clear sky, 75.0°F / 60.0°F",
                "Sun, Jun 09: ☀️ Clear sky, 75.0°F / 60.0°F",
                "",
                "Mon, Jun 10: ☀️ Clear sky, 75.0°F / 60.0°F",
                "Tue, Jun 11: ☀️ Clear sky, 75.0°F / 60.0°F",
            ]
        );
    }

    #[test]
    fn forecast_ending_on_a_weekend_gets_a_trailing_separator() {
        // Fri Jun 07 .. Sun Jun 09.
        let lines = menu_lines(&model("2024-06-07", 3, UnitPreference::Imperial));
        assert_eq!(lines.last().map(String::as_str), Some(""));
        let separators = lines[3..].iter().filter(|l| l.is_empty()).count();
        assert_eq!(separators, 2, "one before the weekend, one trailing");
    }

    #[test]
    fn empty_forecast_renders_header_only() {
        let lines = menu_lines(&model("2024-06-03", 0, UnitPreference::Imperial));
        assert_eq!(lines.len(), 3);
    }
}
