//! Current-conditions data as reported by OpenWeather.
//!
//! Background pollers parse payloads into an [`Observation`] and publish it
//! to a [`LatestObservation`]; the draw path copies the snapshot out once per
//! frame and never holds the lock while drawing.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use thiserror::Error;

/// Example current-weather payload, used by `--simulate`
pub const SAMPLE_PAYLOAD: &str = r#"{
    "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "10d"}],
    "main": {"temp": 16.58, "feels_like": 15.55, "humidity": 48},
    "wind": {"speed": 8.23, "deg": 330, "gust": 13.38}
}"#;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("malformed weather payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has no weather entry")]
    MissingIcon,
    #[error("unknown icon code {0:?}")]
    UnknownIcon(String),
}

// ============================================================================
// Icon codes
// ============================================================================

/// The nine condition groups OpenWeather icons encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    ClearSky,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
}

impl Condition {
    pub const ALL: [Self; 9] = [
        Self::ClearSky,
        Self::FewClouds,
        Self::ScatteredClouds,
        Self::BrokenClouds,
        Self::ShowerRain,
        Self::Rain,
        Self::Thunderstorm,
        Self::Snow,
        Self::Mist,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "01" => Self::ClearSky,
            "02" => Self::FewClouds,
            "03" => Self::ScatteredClouds,
            "04" => Self::BrokenClouds,
            "09" => Self::ShowerRain,
            "10" => Self::Rain,
            "11" => Self::Thunderstorm,
            "13" => Self::Snow,
            "50" => Self::Mist,
            _ => return None,
        })
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::ClearSky => "01",
            Self::FewClouds => "02",
            Self::ScatteredClouds => "03",
            Self::BrokenClouds => "04",
            Self::ShowerRain => "09",
            Self::Rain => "10",
            Self::Thunderstorm => "11",
            Self::Snow => "13",
            Self::Mist => "50",
        }
    }
}

/// A condition plus day/night, written like `"10d"` or `"01n"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconCode {
    pub condition: Condition,
    pub daytime: bool,
}

impl IconCode {
    pub const fn new(condition: Condition, daytime: bool) -> Self {
        Self { condition, daytime }
    }
}

impl FromStr for IconCode {
    type Err = WeatherError;

    /// The first two characters pick the condition; a trailing `n` means night
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let condition = s
            .get(..2)
            .and_then(Condition::from_code)
            .ok_or_else(|| WeatherError::UnknownIcon(s.to_string()))?;
        Ok(Self {
            condition,
            daytime: !s.ends_with('n'),
        })
    }
}

impl fmt::Display for IconCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.daytime { 'd' } else { 'n' };
        write!(f, "{}{}", self.condition.code(), suffix)
    }
}

// ============================================================================
// Observations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Degrees, in whatever units the feed was asked for
    pub temperature: f32,
    pub wind_speed: f32,
    /// Percent
    pub humidity: f32,
    pub icon: IconCode,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    weather: Vec<PayloadWeather>,
    main: PayloadMain,
    #[serde(default)]
    wind: PayloadWind,
}

#[derive(Deserialize)]
struct PayloadWeather {
    icon: String,
}

#[derive(Deserialize)]
struct PayloadMain {
    temp: f32,
    #[serde(default)]
    humidity: f32,
}

#[derive(Deserialize, Default)]
struct PayloadWind {
    #[serde(default)]
    speed: f32,
}

impl Observation {
    /// Parse an OpenWeather current-weather response. Fields beyond
    /// `weather[0].icon`, `main.temp`, `main.humidity` and `wind.speed` are
    /// ignored.
    pub fn from_json(json: &str) -> Result<Self, WeatherError> {
        let payload: Payload = serde_json::from_str(json)?;
        let icon = payload
            .weather
            .first()
            .ok_or(WeatherError::MissingIcon)?
            .icon
            .parse()?;
        Ok(Self {
            temperature: payload.main.temp,
            wind_speed: payload.wind.speed,
            humidity: payload.main.humidity,
            icon,
        })
    }
}

/// Shared slot holding the most recent observation
#[derive(Debug, Clone, Default)]
pub struct LatestObservation {
    slot: Arc<Mutex<Option<Observation>>>,
}

impl LatestObservation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored observation
    pub fn publish(&self, observation: Observation) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(observation);
    }

    /// Copy of the stored observation, if any has arrived yet
    pub fn snapshot(&self) -> Option<Observation> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
