use crate::core::tireset::TyreCondition;
use helpers::general::lin_interp;
use rand::Rng;

/// (s) Lower bound of a race lap time.
pub const T_LAP_MIN: f64 = 60.0;
/// (s) Time gained on the first lap of a fresh set.
const T_NEW_SET_BONUS: f64 = 1.5;

/// Wear penalty support points: (%) wear -> (s) lap time loss, slope 1.0 s/% beyond the last one.
const WEAR_PENALTY_XP: [f64; 6] = [20.0, 40.0, 60.0, 80.0, 100.0, 120.0];
const WEAR_PENALTY_FP: [f64; 6] = [0.0, 1.0, 2.6, 5.0, 10.0, 20.0];
const WEAR_PENALTY_SLOPE_END: f64 = 1.0;

/// * `t_base` - (s) Base time of the compound on the current track
/// * `driver_skill` - [0, 100] Skill of the driver
/// * `car_speed_bonus` - (s) Signed car delta, negative is faster
/// * `tyre_wear` - (%) Wear after this lap
/// * `temperature` - (°C) Tyre temperature after this lap
/// * `condition` - Tyre condition after this lap
/// * `consistency_variation` - (s) Driver/car pace variation of this lap
/// * `new_set` - First lap on a fresh set
#[derive(Debug, Clone, Copy)]
pub struct LapTimeInputs {
    pub t_base: f64,
    pub driver_skill: f64,
    pub car_speed_bonus: f64,
    pub tyre_wear: f64,
    pub temperature: f64,
    pub condition: TyreCondition,
    pub consistency_variation: f64,
    pub new_set: bool,
}

/// calc_driver_delta returns the (s) lap time delta of a driver relative to a neutral driver
/// (skill 50). `scale` is the number of skill points per second.
pub fn calc_driver_delta(skill: f64, scale: f64) -> f64 {
    (50.0 - skill) / scale
}

/// calc_wear_penalty returns the (s) time loss caused by tyre wear. The function is continuous and
/// non-decreasing: flat up to 20%, then bands of increasing slope (0.05, 0.08, 0.12, 0.25, 0.5,
/// 1.0 s per %).
pub fn calc_wear_penalty(tyre_wear: f64) -> f64 {
    lin_interp(
        tyre_wear,
        &WEAR_PENALTY_XP,
        &WEAR_PENALTY_FP,
        WEAR_PENALTY_SLOPE_END,
    )
}

/// calc_temperature_effect returns the (s) time loss caused by the tyre temperature. Penalties on
/// a fresh set are damped to 60%.
pub fn calc_temperature_effect<R: Rng + ?Sized>(
    temperature: f64,
    condition: TyreCondition,
    new_set: bool,
    rng: &mut R,
) -> f64 {
    let new_set_factor = if new_set { 0.6 } else { 1.0 };

    let effect = match condition {
        TyreCondition::Cold => {
            2.0 + (40.0 - temperature.min(40.0)) * 0.15 + rng.gen::<f64>() * 0.8
        }
        TyreCondition::Optimal => (rng.gen::<f64>() - 0.5) * 0.05,
        TyreCondition::Warming => {
            0.8 + (temperature.max(70.0) - 70.0) * 0.08 + rng.gen::<f64>() * 0.4
        }
        TyreCondition::Overheating => {
            2.0 + (temperature.max(85.0) - 85.0) * 0.15 + rng.gen::<f64>() * 0.8
        }
    };

    effect * new_set_factor
}

/// calc_consistency_variation returns the (s) pace variation of the lap. It grows with the driver's
/// inconsistency, fatigue over the race and previous incidents, and is reduced by a reliable car
/// (`car_consistency_bonus` is negative for reliabilities above 50).
pub fn calc_consistency_variation<R: Rng + ?Sized>(
    driver_consistency: f64,
    lap: u32,
    incidents: u32,
    car_consistency_bonus: f64,
    rng: &mut R,
) -> f64 {
    let base_variation = (100.0 - driver_consistency) / 200.0;
    let fatigue = lap as f64 / 50.0 * 0.1;
    let incident_effect = incidents as f64 * 0.03;
    let random_moment = (rng.gen::<f64>() - 0.5) * 0.15;

    base_variation + fatigue + incident_effect + random_moment + car_consistency_bonus * 2.0
}

/// calc_laptime returns the race lap time, at least 60s.
///
/// t_lap = t_base + driver delta + car delta + wear penalty + temperature effect
///     + 0.5 * consistency variation - new set bonus + jitter
pub fn calc_laptime<R: Rng + ?Sized>(inputs: &LapTimeInputs, rng: &mut R) -> f64 {
    let driver_delta = calc_driver_delta(inputs.driver_skill, 50.0);
    let wear_penalty = calc_wear_penalty(inputs.tyre_wear);
    let temperature_effect =
        calc_temperature_effect(inputs.temperature, inputs.condition, inputs.new_set, rng);
    let consistency_effect = inputs.consistency_variation * 0.5;
    let new_set_bonus = if inputs.new_set { T_NEW_SET_BONUS } else { 0.0 };

    let jitter_width = if inputs.new_set { 0.2 } else { 0.5 };
    let jitter = (rng.gen::<f64>() - 0.5) * jitter_width;

    let t_lap = inputs.t_base + driver_delta + inputs.car_speed_bonus + wear_penalty
        + temperature_effect
        + consistency_effect
        - new_set_bonus
        + jitter;

    t_lap.max(T_LAP_MIN)
}
