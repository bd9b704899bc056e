use crate::core::car::{calc_car_effect, CarComponent};
use crate::core::driver::Driver;
use crate::core::lap::LapEngine;
use crate::core::laptime::calc_driver_delta;
use crate::core::tireset::TyreType;
use crate::core::track::TrackCondition;
use crate::error::LapSimError;
use helpers::general::{argsort, SortOrder};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// (s) Lower bound of a qualifying lap time.
pub const T_QUALI_MIN: f64 = 70.0;
/// (s) Time gained by the always fresh qualifying set.
const T_QUALI_NEW_SET_BONUS: f64 = 1.2;
/// Skill points per second of driver delta in qualifying.
const QUALI_DRIVER_SCALE: f64 = 80.0;
const QUALI_CAR_AMPLIFICATION: f64 = 1.5;

/// QualifyingEntry is one driver/car/tyre combination taking part in a qualifying session.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QualifyingEntry {
    pub driver: Driver,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub car_components: Vec<CarComponent>,
    pub tyre_type: TyreType,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QualifyingResult {
    pub driver: Driver,
    pub team: String,
    pub car_components: Vec<CarComponent>,
    pub tyre_type: TyreType,
    pub lap_time: f64,
}

impl LapEngine {
    /// simulate_qualifying_lap returns a single flying lap time. Qualifying has no tyre wear,
    /// temperature or incident state; the car effect is amplified and the random variation
    /// reduced to ±0.4s.
    pub fn simulate_qualifying_lap<R: Rng + ?Sized>(
        &self,
        driver: &Driver,
        components: &[CarComponent],
        tyre: TyreType,
        track: TrackCondition,
        rng: &mut R,
    ) -> Result<f64, LapSimError> {
        driver.validate()?;
        for component in components.iter() {
            component.validate()?;
        }

        let car_effect = calc_car_effect(components);

        let t_base = self.tyre_cfg.base_time(tyre, track);
        let driver_delta = calc_driver_delta(driver.skill, QUALI_DRIVER_SCALE);
        let car_delta = car_effect.speed_bonus * QUALI_CAR_AMPLIFICATION;
        let consistency_variation = (100.0 - driver.consistency) / 300.0;
        let random_variation = (rng.gen::<f64>() - 0.5) * 0.8;

        let t_lap = t_base + driver_delta + car_delta + consistency_variation + random_variation
            - T_QUALI_NEW_SET_BONUS;

        Ok(t_lap.max(T_QUALI_MIN))
    }

    /// simulate_qualifying_session runs one qualifying lap per entry and returns the results
    /// sorted by lap time, fastest first. Equal lap times keep the order of the entries.
    pub fn simulate_qualifying_session<R: Rng + ?Sized>(
        &self,
        entries: &[QualifyingEntry],
        track: TrackCondition,
        rng: &mut R,
    ) -> Result<Vec<QualifyingResult>, LapSimError> {
        let mut lap_times = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            lap_times.push(self.simulate_qualifying_lap(
                &entry.driver,
                &entry.car_components,
                entry.tyre_type,
                track,
                rng,
            )?);
        }

        Ok(argsort(&lap_times, SortOrder::Ascending)
            .into_iter()
            .map(|idx| {
                let entry = &entries[idx];
                QualifyingResult {
                    driver: entry.driver.to_owned(),
                    team: entry.team.to_owned(),
                    car_components: entry.car_components.to_owned(),
                    tyre_type: entry.tyre_type,
                    lap_time: lap_times[idx],
                }
            })
            .collect())
    }
}
