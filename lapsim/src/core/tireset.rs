use crate::core::track::TrackCondition;
use crate::error::LapSimError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wear level above which every additional wear point accelerates further wear.
const WEAR_ACCELERATION_START: f64 = 85.0;
/// Laps on a fresh set during which the tyre wears at a reduced rate.
const NEW_SET_GRACE_LAPS: u32 = 3;
const MIN_WEAR_PER_LAP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TyreType {
    Soft,
    Medium,
    Hard,
    Wet,
    ExtremeWet,
}

impl TyreType {
    pub const ALL: [TyreType; 5] = [
        TyreType::Soft,
        TyreType::Medium,
        TyreType::Hard,
        TyreType::Wet,
        TyreType::ExtremeWet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TyreType::Soft => "soft",
            TyreType::Medium => "medium",
            TyreType::Hard => "hard",
            TyreType::Wet => "wet",
            TyreType::ExtremeWet => "extreme_wet",
        }
    }

    /// is_slick returns true for the dry-weather compounds.
    pub fn is_slick(&self) -> bool {
        matches!(self, TyreType::Soft | TyreType::Medium | TyreType::Hard)
    }

    pub fn is_rain_tyre(&self) -> bool {
        !self.is_slick()
    }
}

impl fmt::Display for TyreType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TyreType {
    type Err = LapSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TyreType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LapSimError::UnknownTyreType(s.to_owned()))
    }
}

/// TyreCondition classifies the tyre temperature relative to the compound's optimal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TyreCondition {
    Cold,
    Warming,
    Optimal,
    Overheating,
}

impl Default for TyreCondition {
    fn default() -> Self {
        TyreCondition::Cold
    }
}

impl TyreCondition {
    /// classify derives the condition from the temperature:
    ///
    /// * more than 15°C below the window -> cold
    /// * up to 15°C below or above the window -> warming
    /// * inside the window -> optimal
    /// * more than 15°C above the window -> overheating
    pub fn classify(temperature: f64, pars: &CompoundPars) -> TyreCondition {
        if temperature < pars.temp_opt_min - 15.0 {
            TyreCondition::Cold
        } else if temperature < pars.temp_opt_min {
            TyreCondition::Warming
        } else if temperature <= pars.temp_opt_max {
            TyreCondition::Optimal
        } else if temperature <= pars.temp_opt_max + 15.0 {
            TyreCondition::Warming
        } else {
            TyreCondition::Overheating
        }
    }

    /// wear_factor is the multiplier this condition applies to the tyre wear rate.
    pub fn wear_factor(&self) -> f64 {
        match self {
            TyreCondition::Cold => 1.3,
            TyreCondition::Warming => 1.05,
            TyreCondition::Optimal => 0.85,
            TyreCondition::Overheating => 1.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TyreCondition::Cold => "cold",
            TyreCondition::Warming => "warming",
            TyreCondition::Optimal => "optimal",
            TyreCondition::Overheating => "overheating",
        }
    }
}

impl fmt::Display for TyreCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// * `t_base_dry` - (s) Base lap time on a dry track
/// * `wear_rate` - (%/lap) Base tyre wear per lap
/// * `max_wear` - (%) Wear at which the set has to be replaced
/// * `warmup_rate` - (°C/lap) Temperature gain while warming up
/// * `cooldown_rate` - (°C/lap) Natural cooling once in operating temperature
/// * `temp_opt_min` - (°C) Lower bound of the optimal temperature window
/// * `temp_opt_max` - (°C) Upper bound of the optimal temperature window
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CompoundPars {
    pub t_base_dry: f64,
    pub wear_rate: f64,
    pub max_wear: f64,
    pub warmup_rate: f64,
    pub cooldown_rate: f64,
    pub temp_opt_min: f64,
    pub temp_opt_max: f64,
}

impl CompoundPars {
    /// Constants of the given compound as used by the engine if no configuration file is read.
    pub fn defaults(tyre: TyreType) -> CompoundPars {
        let (
            t_base_dry,
            wear_rate,
            max_wear,
            warmup_rate,
            cooldown_rate,
            temp_opt_min,
            temp_opt_max,
        ) = match tyre {
            TyreType::Soft => (76.0, 6.0, 140.0, 18.0, 6.0, 65.0, 80.0),
            TyreType::Medium => (78.0, 4.0, 150.0, 15.0, 5.0, 60.0, 75.0),
            TyreType::Hard => (80.0, 2.5, 160.0, 12.0, 4.0, 55.0, 70.0),
            TyreType::Wet => (84.0, 1.5, 180.0, 20.0, 8.0, 40.0, 55.0),
            TyreType::ExtremeWet => (88.0, 1.2, 180.0, 18.0, 7.0, 35.0, 50.0),
        };

        CompoundPars {
            t_base_dry,
            wear_rate,
            max_wear,
            warmup_rate,
            cooldown_rate,
            temp_opt_min,
            temp_opt_max,
        }
    }

    /// validate checks that all constants are finite and positive and that the optimal window is
    /// not empty.
    pub fn validate(&self) -> Result<(), LapSimError> {
        let positive = [
            ("t_base_dry", self.t_base_dry),
            ("wear_rate", self.wear_rate),
            ("max_wear", self.max_wear),
            ("warmup_rate", self.warmup_rate),
            ("cooldown_rate", self.cooldown_rate),
            ("temp_opt_min", self.temp_opt_min),
            ("temp_opt_max", self.temp_opt_max),
        ];
        for &(field, value) in positive.iter() {
            if !value.is_finite() {
                return Err(LapSimError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(LapSimError::NotPositive { field, value });
            }
        }
        if self.temp_opt_min >= self.temp_opt_max {
            return Err(LapSimError::InvalidTemperatureWindow {
                min: self.temp_opt_min,
                max: self.temp_opt_max,
            });
        }
        Ok(())
    }
}

fn default_soft() -> CompoundPars {
    CompoundPars::defaults(TyreType::Soft)
}

fn default_medium() -> CompoundPars {
    CompoundPars::defaults(TyreType::Medium)
}

fn default_hard() -> CompoundPars {
    CompoundPars::defaults(TyreType::Hard)
}

fn default_wet() -> CompoundPars {
    CompoundPars::defaults(TyreType::Wet)
}

fn default_extreme_wet() -> CompoundPars {
    CompoundPars::defaults(TyreType::ExtremeWet)
}

/// TyreConfig holds the constants of all compounds. Compounds missing in a configuration file
/// keep their defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TyreConfig {
    #[serde(default = "default_soft")]
    pub soft: CompoundPars,
    #[serde(default = "default_medium")]
    pub medium: CompoundPars,
    #[serde(default = "default_hard")]
    pub hard: CompoundPars,
    #[serde(default = "default_wet")]
    pub wet: CompoundPars,
    #[serde(default = "default_extreme_wet")]
    pub extreme_wet: CompoundPars,
}

impl Default for TyreConfig {
    fn default() -> Self {
        TyreConfig {
            soft: default_soft(),
            medium: default_medium(),
            hard: default_hard(),
            wet: default_wet(),
            extreme_wet: default_extreme_wet(),
        }
    }
}

impl TyreConfig {
    pub fn validate(&self) -> Result<(), LapSimError> {
        for tyre in TyreType::ALL.iter() {
            self.for_compound(*tyre).validate()?;
        }
        Ok(())
    }

    pub fn for_compound(&self, tyre: TyreType) -> &CompoundPars {
        match tyre {
            TyreType::Soft => &self.soft,
            TyreType::Medium => &self.medium,
            TyreType::Hard => &self.hard,
            TyreType::Wet => &self.wet,
            TyreType::ExtremeWet => &self.extreme_wet,
        }
    }

    /// base_time returns the (s) lap time of the compound on the given track before any driver,
    /// car or tyre state effects.
    pub fn base_time(&self, tyre: TyreType, track: TrackCondition) -> f64 {
        self.for_compound(tyre).t_base_dry + track.rain_penalty(tyre)
    }

    /// max_wear returns the wear at which the compound has to be replaced.
    pub fn max_wear(&self, tyre: TyreType) -> f64 {
        self.for_compound(tyre).max_wear
    }

    /// calc_tyre_wear returns the accumulated wear after driving one more lap.
    ///
    /// wear_lap = wear_rate * (1 + (100 - skill) / 300) * f_speed * f_condition * f_track
    ///     * f_new_set * f_acceleration * U(0.85, 1.15), at least 0.5 per lap
    ///
    /// `tyre_age` is the number of laps already completed on the set.
    #[allow(clippy::too_many_arguments)]
    pub fn calc_tyre_wear<R: Rng + ?Sized>(
        &self,
        cur_wear: f64,
        tyre: TyreType,
        track: TrackCondition,
        driver_skill: f64,
        condition: TyreCondition,
        tyre_age: u32,
        last_lap_time: Option<f64>,
        rng: &mut R,
    ) -> f64 {
        let wear_rate = self.for_compound(tyre).wear_rate;
        let skill_factor = 1.0 + (100.0 - driver_skill) / 300.0;

        // pushing harder than the compound's base pace stresses the tyre
        let speed_factor = match last_lap_time {
            Some(t_last) => {
                let t_base = self.base_time(tyre, track);
                let intensity = ((t_base - t_last) / t_base + 1.0).max(0.8);
                0.8 + intensity * 0.4
            }
            None => 1.0,
        };

        let track_factor = if track != TrackCondition::Dry && tyre.is_slick() {
            1.8
        } else if track == TrackCondition::Dry && tyre.is_rain_tyre() {
            3.0
        } else {
            1.0
        };

        let new_set_factor = if tyre_age < NEW_SET_GRACE_LAPS { 0.6 } else { 1.0 };

        let acceleration_factor = if cur_wear > WEAR_ACCELERATION_START {
            1.0 + (cur_wear - WEAR_ACCELERATION_START) / 15.0
        } else {
            1.0
        };

        let random_factor = 0.85 + rng.gen::<f64>() * 0.3;

        let wear_lap = (wear_rate
            * skill_factor
            * speed_factor
            * condition.wear_factor()
            * track_factor
            * new_set_factor
            * acceleration_factor
            * random_factor)
            .max(MIN_WEAR_PER_LAP);

        (cur_wear + wear_lap).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::mock::StepRng;

    /// Random source whose uniform draws are always 0.5.
    fn mid_rng() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    #[test]
    fn compound_validation() {
        assert_eq!(TyreConfig::default().validate(), Ok(()));

        let mut pars = CompoundPars::defaults(TyreType::Medium);
        pars.temp_opt_min = 80.0;
        assert_eq!(
            pars.validate(),
            Err(LapSimError::InvalidTemperatureWindow {
                min: 80.0,
                max: 75.0
            })
        );

        let mut pars = CompoundPars::defaults(TyreType::Hard);
        pars.max_wear = 0.0;
        assert_eq!(
            pars.validate(),
            Err(LapSimError::NotPositive {
                field: "max_wear",
                value: 0.0
            })
        );

        let mut cfg = TyreConfig::default();
        cfg.wet.t_base_dry = f64::INFINITY;
        assert!(matches!(
            cfg.validate(),
            Err(LapSimError::NotFinite {
                field: "t_base_dry",
                ..
            })
        ));
    }

    #[test]
    fn classify_window_edges() {
        let pars = CompoundPars::defaults(TyreType::Medium); // window 60-75
        assert_eq!(TyreCondition::classify(44.9, &pars), TyreCondition::Cold);
        assert_eq!(TyreCondition::classify(45.0, &pars), TyreCondition::Warming);
        assert_eq!(TyreCondition::classify(59.9, &pars), TyreCondition::Warming);
        assert_eq!(TyreCondition::classify(60.0, &pars), TyreCondition::Optimal);
        assert_eq!(TyreCondition::classify(75.0, &pars), TyreCondition::Optimal);
        assert_eq!(TyreCondition::classify(90.0, &pars), TyreCondition::Warming);
        assert_eq!(TyreCondition::classify(90.1, &pars), TyreCondition::Overheating);
    }

    #[test]
    fn base_time_includes_rain_penalty() {
        let cfg = TyreConfig::default();
        assert_abs_diff_eq!(cfg.base_time(TyreType::Soft, TrackCondition::Dry), 76.0);
        assert_abs_diff_eq!(cfg.base_time(TyreType::Medium, TrackCondition::HeavyRain), 90.0);
        assert_abs_diff_eq!(cfg.base_time(TyreType::Wet, TrackCondition::LightRain), 84.5);
        assert_abs_diff_eq!(cfg.base_time(TyreType::ExtremeWet, TrackCondition::HeavyRain), 89.0);
    }

    #[test]
    fn max_wear_per_compound() {
        let cfg = TyreConfig::default();
        assert_abs_diff_eq!(cfg.max_wear(TyreType::Soft), 140.0);
        assert_abs_diff_eq!(cfg.max_wear(TyreType::Medium), 150.0);
        assert_abs_diff_eq!(cfg.max_wear(TyreType::Hard), 160.0);
        assert_abs_diff_eq!(cfg.max_wear(TyreType::ExtremeWet), 180.0);
    }

    #[test]
    fn fresh_soft_wear_with_neutral_draw() {
        let cfg = TyreConfig::default();
        let wear = cfg.calc_tyre_wear(
            0.0,
            TyreType::Soft,
            TrackCondition::Dry,
            80.0,
            TyreCondition::Cold,
            0,
            None,
            &mut mid_rng(),
        );
        // 6.0 * (1 + 20/300) * 1.3 * 0.6
        assert_abs_diff_eq!(wear, 4.992, epsilon = 1e-9);
    }

    #[test]
    fn wear_accelerates_beyond_85() {
        let cfg = TyreConfig::default();
        let wear_at = |cur: f64| {
            cfg.calc_tyre_wear(
                cur,
                TyreType::Medium,
                TrackCondition::Dry,
                100.0,
                TyreCondition::Optimal,
                10,
                None,
                &mut mid_rng(),
            ) - cur
        };
        assert_abs_diff_eq!(wear_at(50.0), 4.0 * 0.85, epsilon = 1e-9);
        assert_abs_diff_eq!(wear_at(100.0), 4.0 * 0.85 * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn wear_never_below_minimum_increment() {
        let mut cfg = TyreConfig::default();
        cfg.hard.wear_rate = 0.1;
        let wear = cfg.calc_tyre_wear(
            10.0,
            TyreType::Hard,
            TrackCondition::Dry,
            100.0,
            TyreCondition::Optimal,
            0,
            None,
            &mut StepRng::new(0, 0),
        );
        assert_abs_diff_eq!(wear, 10.5, epsilon = 1e-9);
    }

    #[test]
    fn wet_compound_on_dry_track_wears_three_times_faster() {
        let cfg = TyreConfig::default();
        let wear = cfg.calc_tyre_wear(
            0.0,
            TyreType::Wet,
            TrackCondition::Dry,
            100.0,
            TyreCondition::Optimal,
            5,
            None,
            &mut mid_rng(),
        );
        assert_abs_diff_eq!(wear, 1.5 * 0.85 * 3.0, epsilon = 1e-9);
    }

    #[test]
    fn tyre_config_reads_partial_json() {
        let cfg: TyreConfig = serde_json::from_str(
            r#"{"soft": {"t_base_dry": 70.0, "wear_rate": 7.0, "max_wear": 130.0,
                "warmup_rate": 18.0, "cooldown_rate": 6.0, "temp_opt_min": 65.0,
                "temp_opt_max": 80.0}}"#,
        )
        .unwrap();
        assert_abs_diff_eq!(cfg.soft.t_base_dry, 70.0);
        assert_eq!(cfg.medium, CompoundPars::defaults(TyreType::Medium));
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("extreme_wet".parse::<TyreType>(), Ok(TyreType::ExtremeWet));
        assert!("intermediate".parse::<TyreType>().is_err());
    }
}
