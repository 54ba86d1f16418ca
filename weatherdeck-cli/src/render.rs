//! Plain-text rendering of dashboard state.

use chrono::Local;
use weatherdeck_core::{DetailPanel, ForecastDay, Theme, Tip, TipKind, Toast, WeatherSnapshot};

/// Terminal columns per panel width unit.
const UNITS_PER_COLUMN: u16 = 8;

pub fn toast(toast: &Toast) {
    println!("{} {}", toast.kind.icon(), toast.message);
}

pub fn cards(cards: &[WeatherSnapshot], theme: Theme) {
    let rule = match theme {
        Theme::Light => "-",
        Theme::Dark => "=",
    }
    .repeat(48);

    if cards.is_empty() {
        println!("No saved locations yet. Try `weatherdeck search city London`.");
        return;
    }

    let today = Local::now().format("%x");
    for card in cards {
        println!("{rule}");
        println!("{}  [{}]", card.display_name(), card.identity_key());
        println!("{today}");
        println!(
            "{:.0}°C  {}  wind: {:.0} km/h {}",
            card.temperature_c,
            card.description,
            card.wind_speed_kmh(),
            card.wind_direction_short(),
        );
        println!(
            "Max: {:.0}°C  Min: {:.0}°C  Humidity: {}%  Pressure: {} hPa",
            card.temp_max_c, card.temp_min_c, card.humidity_pct, card.pressure_hpa,
        );
        println!("Clouds: {}%  Visibility: {} km", card.clouds_pct, card.visibility_km());
    }
    println!("{rule}");
}

pub fn forecast(location: &str, days: &[ForecastDay]) {
    println!("3-day forecast for {location}");
    for day in days {
        println!(
            "  {:<12} {:>5.1} / {:>5.1} °C  {} ({})",
            day.day, day.min_c, day.max_c, day.description, day.icon
        );
    }
}

pub fn detail(panel: &DetailPanel, tips: &[Tip]) {
    let Some(s) = panel.selected() else {
        return;
    };
    let columns = usize::from(panel.width() / UNITS_PER_COLUMN);

    println!("{}", s.display_name());
    println!(
        "{:.0}°C, feels like {:.0}°C, {}",
        s.temperature_c, s.feels_like_c, s.description
    );
    println!("  Min / Max   {:.0}° / {:.0}°", s.temp_min_c, s.temp_max_c);
    println!("  Humidity    {}%", s.humidity_pct);
    println!("  Visibility  {:.1} km", s.visibility_km());
    println!("  Wind        {} m/s {}", s.wind_speed_mps, s.wind_direction());
    println!("  Pressure    {} hPa", s.pressure_hpa);
    println!("  Cloudiness  {}%", s.clouds_pct);
    if let (Some(rise), Some(set)) = (s.sunrise_local(), s.sunset_local()) {
        println!("  Sunrise     {rise}");
        println!("  Sunset      {set}");
    }

    println!();
    println!("Smart Tips");
    for tip in tips {
        println!("{} {} [{}]", tip.icon, tip.title, kind_label(tip.kind));
        for line in wrap(tip.message, columns) {
            println!("    {line}");
        }
    }
}

fn kind_label(kind: TipKind) -> &'static str {
    match kind {
        TipKind::Info => "info",
        TipKind::Warning => "warning",
        TipKind::Danger => "danger",
        TipKind::Success => "success",
    }
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_columns() {
        let lines = wrap("Take an umbrella and wear waterproof shoes.", 20);
        assert_eq!(lines, vec!["Take an umbrella and", "wear waterproof", "shoes."]);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn long_word_gets_its_own_line() {
        let lines = wrap("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }
}
