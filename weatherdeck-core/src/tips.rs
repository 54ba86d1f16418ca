//! Rule-based advice derived from a single weather snapshot.

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::model::WeatherSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Info,
    Warning,
    Danger,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub icon: &'static str,
    pub kind: TipKind,
    pub title: &'static str,
    pub message: &'static str,
}

const fn tip(
    icon: &'static str,
    kind: TipKind,
    title: &'static str,
    message: &'static str,
) -> Tip {
    Tip {
        icon,
        kind,
        title,
        message,
    }
}

pub const HEAT_ALERT: Tip = tip(
    "🔥",
    TipKind::Warning,
    "Heat Alert!",
    "Stay hydrated, wear light colors, and avoid prolonged sun exposure.",
);
pub const WARM_WEATHER: Tip = tip(
    "☀️",
    TipKind::Info,
    "Warm Weather",
    "Perfect weather for outdoor activities. Don't forget sunscreen!",
);
pub const FREEZING_COLD: Tip = tip(
    "🥶",
    TipKind::Warning,
    "Freezing Cold",
    "Bundle up! Wear layers, gloves, and cover exposed skin.",
);
pub const COLD_WEATHER: Tip = tip(
    "🧥",
    TipKind::Info,
    "Cold Weather",
    "Wear a warm jacket and consider bringing a scarf.",
);
pub const RAINY_DAY: Tip = tip(
    "☔",
    TipKind::Warning,
    "Rainy Day",
    "Take an umbrella and wear waterproof shoes.",
);
pub const SNOWY_CONDITIONS: Tip = tip(
    "❄️",
    TipKind::Warning,
    "Snowy Conditions",
    "Drive carefully, wear non-slip shoes, and dress warmly.",
);
pub const THUNDERSTORM_ALERT: Tip = tip(
    "⛈️",
    TipKind::Danger,
    "Thunderstorm Alert",
    "Stay indoors, avoid open areas, and postpone outdoor activities.",
);
pub const LOW_VISIBILITY: Tip = tip(
    "🌫️",
    TipKind::Warning,
    "Low Visibility",
    "Drive slowly, use headlights, and be extra cautious.",
);
pub const HIGH_HUMIDITY: Tip = tip(
    "💧",
    TipKind::Info,
    "High Humidity",
    "It may feel warmer than it is. Choose breathable fabrics.",
);
pub const WINDY: Tip = tip(
    "💨",
    TipKind::Warning,
    "Windy Conditions",
    "Secure loose items and be careful with umbrellas.",
);
pub const VERY_CLOUDY: Tip = tip(
    "☁️",
    TipKind::Info,
    "Very Cloudy",
    "Overcast skies expected. Great for outdoor activities without harsh sun!",
);
pub const PARTLY_CLOUDY: Tip = tip(
    "⛅",
    TipKind::Info,
    "Partly Cloudy",
    "Mixed sun and clouds. Perfect for most outdoor activities.",
);
pub const PLEASANT: Tip = tip(
    "🌤️",
    TipKind::Success,
    "Pleasant Weather",
    "Comfortable temperature for walking, cycling, or outdoor dining!",
);
pub const SUN_PROTECTION: Tip = tip(
    "🕶️",
    TipKind::Warning,
    "Sun Protection",
    "Clear skies ahead! Don't forget sunglasses and sunscreen.",
);
pub const PERFECT_WEATHER: Tip = tip(
    "🌟",
    TipKind::Success,
    "Perfect Weather",
    "Great day for outdoor activities, picnics, or a walk!",
);
pub const COOL_COMFORTABLE: Tip = tip(
    "🧥",
    TipKind::Info,
    "Cool but Comfortable",
    "Light jacket recommended. Perfect for brisk walks or jogging.",
);
pub const COOL_EVENING: Tip = tip(
    "🌙",
    TipKind::Info,
    "Cool Evening",
    "Temperature drops in the evening. Consider bringing an extra layer.",
);
pub const GOOD_FOR_WALKING: Tip = tip(
    "🚶",
    TipKind::Success,
    "Great for Walking",
    "Good conditions for outdoor exercise and fresh air activities.",
);
pub const STAY_INFORMED: Tip = tip(
    "🌍",
    TipKind::Info,
    "Weather Update",
    "Stay informed about changing weather conditions throughout the day.",
);

/// Tips for `snapshot` using the local wall clock.
pub fn derive_tips_now(snapshot: &WeatherSnapshot) -> Vec<Tip> {
    derive_tips(snapshot, Local::now().hour())
}

/// Evaluate every rule in priority order. Never returns an empty list.
pub fn derive_tips(snapshot: &WeatherSnapshot, local_hour: u32) -> Vec<Tip> {
    let temp = snapshot.temperature_c;
    let condition = snapshot.condition.to_lowercase();
    let has = |word: &str| condition.contains(word);
    let clouds = snapshot.clouds_pct;

    let mut tips = Vec::new();

    if temp > 35.0 {
        tips.push(HEAT_ALERT);
    } else if temp > 25.0 {
        tips.push(WARM_WEATHER);
    } else if temp < 0.0 {
        tips.push(FREEZING_COLD);
    } else if temp < 10.0 {
        tips.push(COLD_WEATHER);
    }

    if has("rain") || has("drizzle") {
        tips.push(RAINY_DAY);
    } else if has("snow") {
        tips.push(SNOWY_CONDITIONS);
    } else if has("storm") || has("thunder") {
        tips.push(THUNDERSTORM_ALERT);
    } else if has("fog") || has("mist") {
        tips.push(LOW_VISIBILITY);
    }

    if snapshot.humidity_pct > 80 {
        tips.push(HIGH_HUMIDITY);
    }

    if snapshot.wind_speed_mps > 10.0 {
        tips.push(WINDY);
    }

    if clouds >= 80 {
        tips.push(VERY_CLOUDY);
    } else if clouds >= 50 {
        tips.push(PARTLY_CLOUDY);
    }

    if (15.0..=20.0).contains(&temp) && !has("rain") && !has("snow") {
        tips.push(PLEASANT);
    }

    if has("clear") || clouds < 30 {
        tips.push(SUN_PROTECTION);
    }

    if has("clear") && (15.0..=25.0).contains(&temp) {
        tips.push(PERFECT_WEATHER);
    }

    if (10.0..=15.0).contains(&temp) {
        tips.push(COOL_COMFORTABLE);
    }

    if (local_hour >= 18 || local_hour <= 6) && temp < 15.0 {
        tips.push(COOL_EVENING);
    }

    if !has("rain") && !has("storm") && (12.0..=25.0).contains(&temp) {
        tips.push(GOOD_FOR_WALKING);
    }

    if tips.is_empty() {
        tips.push(STAY_INFORMED);
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::snapshot;

    fn weather(temp: f64, condition: &str, humidity: u8, wind: f64, clouds: u8) -> WeatherSnapshot {
        let mut s = snapshot(Some(1), "Test");
        s.temperature_c = temp;
        s.condition = condition.to_string();
        s.humidity_pct = humidity;
        s.wind_speed_mps = wind;
        s.clouds_pct = clouds;
        s
    }

    fn titles(tips: &[Tip]) -> Vec<&'static str> {
        tips.iter().map(|t| t.title).collect()
    }

    #[test]
    fn hot_clear_day() {
        let tips = derive_tips(&weather(40.0, "Clear", 30, 2.0, 10), 12);
        let titles = titles(&tips);

        assert!(titles.contains(&"Heat Alert!"));
        assert!(titles.contains(&"Sun Protection"));
        assert!(!titles.contains(&"Cold Weather"));
        assert!(!titles.contains(&"Freezing Cold"));
        assert!(!titles.contains(&"Rainy Day"));
        assert_eq!(titles, vec!["Heat Alert!", "Sun Protection"]);
    }

    #[test]
    fn condition_match_is_case_insensitive_and_first_wins() {
        let tips = derive_tips(&weather(5.0, "RAIN", 50, 1.0, 60), 12);
        assert_eq!(titles(&tips), vec!["Cold Weather", "Rainy Day", "Partly Cloudy"]);

        let tips = derive_tips(&weather(22.0, "Thunderstorm", 50, 1.0, 90), 12);
        assert_eq!(titles(&tips), vec!["Thunderstorm Alert", "Very Cloudy"]);
    }

    #[test]
    fn temperature_bands_are_exclusive() {
        assert_eq!(derive_tips(&weather(-3.0, "Snow", 50, 1.0, 90), 12)[0], FREEZING_COLD);
        assert_eq!(derive_tips(&weather(30.0, "Clouds", 50, 1.0, 90), 12)[0], WARM_WEATHER);
    }

    #[test]
    fn inclusive_bounds() {
        let titles = titles(&derive_tips(&weather(15.0, "Clear", 50, 1.0, 10), 12));
        assert_eq!(
            titles,
            vec![
                "Pleasant Weather",
                "Sun Protection",
                "Perfect Weather",
                "Cool but Comfortable",
                "Great for Walking",
            ]
        );
    }

    #[test]
    fn humidity_and_wind_are_independent() {
        let titles = titles(&derive_tips(&weather(28.0, "Mist", 85, 12.0, 40), 12));
        assert_eq!(
            titles,
            vec!["Warm Weather", "Low Visibility", "High Humidity", "Windy Conditions"]
        );
    }

    #[test]
    fn cool_evening_only_after_dark() {
        let day = titles(&derive_tips(&weather(11.0, "Clouds", 50, 1.0, 40), 12));
        let night = titles(&derive_tips(&weather(11.0, "Clouds", 50, 1.0, 40), 22));
        let dawn = titles(&derive_tips(&weather(11.0, "Clouds", 50, 1.0, 40), 6));

        assert!(!day.contains(&"Cool Evening"));
        assert!(night.contains(&"Cool Evening"));
        assert!(dawn.contains(&"Cool Evening"));
    }

    #[test]
    fn rain_suppresses_walking_and_pleasant() {
        let tips = derive_tips(&weather(26.0, "Rain", 50, 1.0, 40), 12);
        assert_eq!(titles(&tips), vec!["Warm Weather", "Rainy Day"]);

        let tips = derive_tips(&weather(18.0, "Drizzle", 50, 1.0, 40), 12);
        assert_eq!(titles(&tips), vec!["Rainy Day", "Pleasant Weather", "Great for Walking"]);
    }

    #[test]
    fn single_rule_matches() {
        let tips = derive_tips(&weather(21.0, "Rain", 50, 1.0, 40), 12);
        assert_eq!(tips, vec![RAINY_DAY]);

        let tips = derive_tips(&weather(21.0, "Haze", 50, 1.0, 40), 12);
        assert_eq!(tips, vec![GOOD_FOR_WALKING]);
    }

    #[test]
    fn default_tip_when_nothing_matches() {
        let tips = derive_tips(&weather(f64::NAN, "Haze", 50, 1.0, 40), 12);
        assert_eq!(tips, vec![STAY_INFORMED]);
    }

    fn only(temp: f64, condition: &str, clouds: u8, hour: u32) -> Vec<&'static str> {
        titles(&derive_tips(&weather(temp, condition, 50, 1.0, clouds), hour))
    }

    #[test]
    fn heat_and_warm_thresholds_are_strict() {
        assert_eq!(only(35.0, "Haze", 40, 12), vec!["Warm Weather"]);
        assert_eq!(only(35.1, "Haze", 40, 12), vec!["Heat Alert!"]);
        assert_eq!(only(25.0, "Haze", 40, 12), vec!["Great for Walking"]);
        assert_eq!(only(25.1, "Haze", 40, 12), vec!["Warm Weather"]);
    }

    #[test]
    fn freezing_and_cold_thresholds_are_strict() {
        assert_eq!(only(0.0, "Haze", 40, 12), vec!["Cold Weather"]);
        assert_eq!(only(-0.1, "Haze", 40, 12), vec!["Freezing Cold"]);
        assert_eq!(only(10.0, "Haze", 40, 12), vec!["Cool but Comfortable"]);
        assert_eq!(only(9.9, "Haze", 40, 12), vec!["Cold Weather"]);
    }

    #[test]
    fn comfort_ranges_include_their_upper_bound() {
        assert_eq!(
            only(20.0, "Haze", 40, 12),
            vec!["Pleasant Weather", "Great for Walking"]
        );
        assert_eq!(only(20.1, "Haze", 40, 12), vec!["Great for Walking"]);

        assert_eq!(
            only(25.0, "Clear", 40, 12),
            vec!["Sun Protection", "Perfect Weather", "Great for Walking"]
        );
        assert_eq!(
            only(25.1, "Clear", 40, 12),
            vec!["Warm Weather", "Sun Protection"]
        );

        assert_eq!(
            only(12.0, "Haze", 40, 12),
            vec!["Cool but Comfortable", "Great for Walking"]
        );
        assert_eq!(only(11.9, "Haze", 40, 12), vec!["Cool but Comfortable"]);
    }

    #[test]
    fn cloud_thresholds() {
        // NaN keeps every temperature rule out of the way
        assert_eq!(only(f64::NAN, "Haze", 80, 12), vec!["Very Cloudy"]);
        assert_eq!(only(f64::NAN, "Haze", 79, 12), vec!["Partly Cloudy"]);
        assert_eq!(only(f64::NAN, "Haze", 50, 12), vec!["Partly Cloudy"]);
        assert_eq!(only(f64::NAN, "Haze", 49, 12), vec!["Weather Update"]);
        assert_eq!(only(f64::NAN, "Haze", 30, 12), vec!["Weather Update"]);
        assert_eq!(only(f64::NAN, "Haze", 29, 12), vec!["Sun Protection"]);
    }

    #[test]
    fn evening_hours_are_inclusive() {
        assert_eq!(
            only(11.0, "Haze", 40, 18),
            vec!["Cool but Comfortable", "Cool Evening"]
        );
        assert_eq!(only(11.0, "Haze", 40, 17), vec!["Cool but Comfortable"]);
        assert_eq!(
            only(11.0, "Haze", 40, 6),
            vec!["Cool but Comfortable", "Cool Evening"]
        );
        assert_eq!(only(11.0, "Haze", 40, 7), vec!["Cool but Comfortable"]);
        assert!(!only(15.0, "Haze", 40, 22).contains(&"Cool Evening"));
    }

    #[test]
    fn humidity_and_wind_thresholds_are_strict() {
        let calm = weather(f64::NAN, "Haze", 80, 10.0, 40);
        assert_eq!(derive_tips(&calm, 12), vec![STAY_INFORMED]);

        let humid = weather(f64::NAN, "Haze", 81, 10.0, 40);
        assert_eq!(derive_tips(&humid, 12), vec![HIGH_HUMIDITY]);

        let windy = weather(f64::NAN, "Haze", 80, 10.1, 40);
        assert_eq!(derive_tips(&windy, 12), vec![WINDY]);
    }

    #[test]
    fn never_empty_across_a_grid() {
        for temp in [-20.0, 0.0, 9.9, 10.0, 12.0, 15.0, 20.0, 25.0, 25.1, 35.1] {
            for condition in ["Clear", "Rain", "Snow", "Thunderstorm", "Fog", "Haze"] {
                for clouds in [0, 30, 50, 80, 100] {
                    for hour in [0, 12, 18] {
                        let tips = derive_tips(&weather(temp, condition, 50, 1.0, clouds), hour);
                        assert!(!tips.is_empty(), "{temp} {condition} {clouds} {hour}");
                    }
                }
            }
        }
    }
}
