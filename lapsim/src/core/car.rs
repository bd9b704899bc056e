use crate::error::{check_rating, LapSimError};
use helpers::general::argmax;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Neutral rating: a car at this strength/reliability gets neither bonus nor penalty.
const NEUTRAL_RATING: f64 = 50.0;
/// Maximum probability of a mechanical failure per lap.
pub const MAX_FAILURE_RISK: f64 = 0.15;
/// Components below this reliability add extra failure risk.
const FRAGILE_RELIABILITY: f64 = 30.0;
/// (s) Time lost by a lap-ending mechanical failure.
pub const T_MECHANICAL_FAILURE: f64 = 30.0;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum CarStatus {
    Running,
    DNF,
}

/// * `component_type` - Part identifier, e.g. engine, suspension, brakes
/// * `strength` - [0, 100] Performance of the part
/// * `reliability` - [0, 100] Durability of the part
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CarComponent {
    pub component_type: String,
    pub strength: f64,
    pub reliability: f64,
}

impl CarComponent {
    pub fn new(component_type: &str, strength: f64, reliability: f64) -> CarComponent {
        CarComponent {
            component_type: component_type.to_owned(),
            strength,
            reliability,
        }
    }

    pub fn validate(&self) -> Result<(), LapSimError> {
        check_rating("strength", self.strength)?;
        check_rating("reliability", self.reliability)
    }
}

/// CarPerformance is the unweighted mean of a car's component ratings.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct CarPerformance {
    pub strength: f64,
    pub reliability: f64,
}

impl Default for CarPerformance {
    fn default() -> Self {
        CarPerformance {
            strength: NEUTRAL_RATING,
            reliability: NEUTRAL_RATING,
        }
    }
}

/// CarEffect contains the time deltas caused by the car. Both are signed lap time deltas, i.e.
/// negative values make the car faster (`speed_bonus`) or its pace smoother (`consistency_bonus`).
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct CarEffect {
    pub speed_bonus: f64,
    pub consistency_bonus: f64,
    pub raw_performance: CarPerformance,
}

/// calc_car_performance returns the mean strength and reliability of the components, or the
/// neutral 50/50 car if there are none.
pub fn calc_car_performance(components: &[CarComponent]) -> CarPerformance {
    if components.is_empty() {
        return CarPerformance::default();
    }

    let no_components = components.len() as f64;
    let (strength_sum, reliability_sum) = components
        .iter()
        .fold((0.0, 0.0), |(s, r), c| (s + c.strength, r + c.reliability));

    CarPerformance {
        strength: strength_sum / no_components,
        reliability: reliability_sum / no_components,
    }
}

/// calc_car_effect converts the car performance into lap time deltas: -0.01s per strength point
/// and -0.005 per reliability point above 50. Ratings outside [0, 100] are extrapolated.
pub fn calc_car_effect(components: &[CarComponent]) -> CarEffect {
    let performance = calc_car_performance(components);

    CarEffect {
        speed_bonus: -(performance.strength - NEUTRAL_RATING) * 0.01,
        consistency_bonus: -(performance.reliability - NEUTRAL_RATING) * 0.005,
        raw_performance: performance,
    }
}

/// calc_mechanical_failure_risk returns the probability of a mechanical failure in the current
/// lap, limited to [0, 0.15].
///
/// risk = (100 - reliability) / 500 + cur_lap / tot_no_laps * 0.05 + incidents * 0.02
///     + sum over fragile parts of (30 - reliability) * 0.001
pub fn calc_mechanical_failure_risk(
    components: &[CarComponent],
    cur_lap: u32,
    tot_no_laps: u32,
    incidents: u32,
) -> f64 {
    let performance = calc_car_performance(components);

    let base_risk = (100.0 - performance.reliability) / 500.0;
    let late_race_risk = if tot_no_laps > 0 {
        cur_lap as f64 / tot_no_laps as f64 * 0.05
    } else {
        0.0
    };
    let incident_risk = incidents as f64 * 0.02;
    let component_risk: f64 = components
        .iter()
        .filter(|c| c.reliability < FRAGILE_RELIABILITY)
        .map(|c| (FRAGILE_RELIABILITY - c.reliability) * 0.001)
        .sum();

    (base_risk + late_race_risk + incident_risk + component_risk).clamp(0.0, MAX_FAILURE_RISK)
}

/// determine_failed_component picks the part that broke. Every part draws a score
/// (100 - reliability) * U(0, 1), the highest score fails. Returns `None` for a car without
/// components.
pub fn determine_failed_component<R: Rng + ?Sized>(
    components: &[CarComponent],
    rng: &mut R,
) -> Option<String> {
    let scores: Vec<f64> = components
        .iter()
        .map(|c| (100.0 - c.reliability) * rng.gen::<f64>())
        .collect();

    argmax(&scores).map(|idx| components[idx].component_type.to_owned())
}
