use crate::core::tireset::TyreType;
use crate::error::LapSimError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// TrackCondition describes the weather-dependent state of the track surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackCondition {
    Dry,
    LightRain,
    HeavyRain,
}

impl TrackCondition {
    pub const ALL: [TrackCondition; 3] = [
        TrackCondition::Dry,
        TrackCondition::LightRain,
        TrackCondition::HeavyRain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackCondition::Dry => "dry",
            TrackCondition::LightRain => "light_rain",
            TrackCondition::HeavyRain => "heavy_rain",
        }
    }

    /// appropriate_tyre returns the compound recommended for the track condition.
    pub fn appropriate_tyre(&self) -> TyreType {
        match self {
            TrackCondition::Dry => TyreType::Soft,
            TrackCondition::LightRain => TyreType::Wet,
            TrackCondition::HeavyRain => TyreType::ExtremeWet,
        }
    }

    /// rain_penalty returns the (s) lap time added to a compound's dry base time.
    pub fn rain_penalty(&self, tyre: TyreType) -> f64 {
        match (self, tyre) {
            (TrackCondition::Dry, _) => 0.0,
            (TrackCondition::LightRain, TyreType::Wet) => 0.5,
            (TrackCondition::LightRain, TyreType::ExtremeWet) => 2.0,
            (TrackCondition::LightRain, _) => 6.0,
            (TrackCondition::HeavyRain, TyreType::Wet) => 3.0,
            (TrackCondition::HeavyRain, TyreType::ExtremeWet) => 1.0,
            (TrackCondition::HeavyRain, _) => 12.0,
        }
    }

    /// temperature_multiplier is applied to the tyre temperature at the end of every lap.
    pub fn temperature_multiplier(&self) -> f64 {
        match self {
            TrackCondition::Dry => 1.05,
            TrackCondition::LightRain => 0.6,
            TrackCondition::HeavyRain => 0.4,
        }
    }

    /// cooling_effect returns the (°C) per-lap cooling caused by the track surface.
    pub fn cooling_effect<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            TrackCondition::Dry => 1.0 + rng.gen::<f64>() * 0.5,
            TrackCondition::LightRain => 3.0 + rng.gen::<f64>() * 1.0,
            TrackCondition::HeavyRain => 5.0 + rng.gen::<f64>() * 2.0,
        }
    }
}

/// is_wrong_tyre_for_conditions checks whether the compound does not suit the track condition.
/// Only extreme wets are right for heavy rain.
pub fn is_wrong_tyre_for_conditions(tyre: TyreType, track: TrackCondition) -> bool {
    match track {
        TrackCondition::Dry => tyre.is_rain_tyre(),
        TrackCondition::LightRain => tyre.is_slick(),
        TrackCondition::HeavyRain => tyre != TyreType::ExtremeWet,
    }
}

impl fmt::Display for TrackCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrackCondition {
    type Err = LapSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackCondition::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LapSimError::UnknownTrackCondition(s.to_owned()))
    }
}
