use crate::core::car::{
    calc_car_effect, calc_mechanical_failure_risk, determine_failed_component, CarComponent,
    CarPerformance, T_MECHANICAL_FAILURE,
};
use crate::core::driver::Driver;
use crate::core::incident::{
    check_incidents, Incident, IncidentInputs, IncidentKind, WEAR_PIT_CEILING,
};
use crate::core::laptime::{calc_consistency_variation, calc_laptime, LapTimeInputs};
use crate::core::thermal::{calc_tyre_temperature, ThermalInputs, TEMP_MAX};
use crate::core::tireset::{TyreCondition, TyreConfig, TyreType};
use crate::core::track::TrackCondition;
use crate::error::LapSimError;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Race distance assumed by the failure model if the caller does not set one.
pub const DEFAULT_TOT_NO_LAPS: u32 = 60;
/// (s) Minimum improvement over the previous lap that counts as a fast lap.
const FAST_LAP_IMPROVEMENT: f64 = 0.5;
/// Fast laps in a row after which the tyres start to overheat.
const FAST_LAP_STREAK: u32 = 3;

/// PreviousLap is the state carried from one lap into the next.
///
/// * `tyre_wear` - (%) Accumulated wear of the current set
/// * `tyre_temperature` - (°C) Tyre temperature at the end of the previous lap
/// * `tyre_condition` - Tyre condition at the end of the previous lap
/// * `consecutive_fast_laps` - Number of improving laps in a row
/// * `pit_stop` - The previous lap ended in the pits
/// * `fresh_tyres` - The car starts the race on a fresh set
/// * `tot_no_laps` - Race distance in laps
/// * `incidents` - Incidents so far in the race
/// * `last_lap_time` - (s) Lap time of the previous lap, if there was one
/// * `tyre_age` - Laps completed on the current set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviousLap {
    pub tyre_wear: f64,
    pub tyre_temperature: f64,
    pub tyre_condition: TyreCondition,
    pub consecutive_fast_laps: u32,
    pub pit_stop: bool,
    pub fresh_tyres: bool,
    pub tot_no_laps: u32,
    pub incidents: u32,
    pub last_lap_time: Option<f64>,
    pub tyre_age: u32,
}

impl Default for PreviousLap {
    fn default() -> Self {
        PreviousLap::race_start(DEFAULT_TOT_NO_LAPS)
    }
}

impl PreviousLap {
    /// race_start returns the state before lap 1: cold, unused tyres.
    pub fn race_start(tot_no_laps: u32) -> PreviousLap {
        PreviousLap {
            tyre_wear: 0.0,
            tyre_temperature: 0.0,
            tyre_condition: TyreCondition::Cold,
            consecutive_fast_laps: 0,
            pit_stop: false,
            fresh_tyres: true,
            tot_no_laps,
            incidents: 0,
            last_lap_time: None,
            tyre_age: 0,
        }
    }

    /// advance returns the input for the lap following `result`.
    pub fn advance(&self, result: &LapResult) -> PreviousLap {
        PreviousLap {
            tyre_wear: result.tyre_wear,
            tyre_temperature: result.tyre_temperature,
            tyre_condition: result.tyre_condition,
            consecutive_fast_laps: result.consecutive_fast_laps,
            pit_stop: result.pit_stop,
            fresh_tyres: false,
            tot_no_laps: self.tot_no_laps,
            incidents: self.incidents + result.incident.is_some() as u32,
            last_lap_time: Some(result.lap_time),
            tyre_age: result.tyre_laps,
        }
    }

    pub fn validate(&self) -> Result<(), LapSimError> {
        if self.tot_no_laps == 0 {
            return Err(LapSimError::NoLaps);
        }
        if !self.tyre_wear.is_finite() {
            return Err(LapSimError::NotFinite {
                field: "tyre_wear",
                value: self.tyre_wear,
            });
        }
        if self.tyre_wear < 0.0 {
            return Err(LapSimError::NegativeWear(self.tyre_wear));
        }
        if !self.tyre_temperature.is_finite() {
            return Err(LapSimError::NotFinite {
                field: "tyre_temperature",
                value: self.tyre_temperature,
            });
        }
        match self.last_lap_time {
            Some(t) if !t.is_finite() => Err(LapSimError::NotFinite {
                field: "last_lap_time",
                value: t,
            }),
            _ => Ok(()),
        }
    }
}

/// LapResult contains the outcome of one simulated lap and the tyre state the next lap starts
/// with. If `mechanical_failure` is set the lap was not completed: `lap_time` is 0 and the tyre
/// state is the one the lap started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapResult {
    pub lap_time: f64,
    pub tyre_wear: f64,
    pub tyre_temperature: f64,
    pub tyre_condition: TyreCondition,
    pub incident: Option<Incident>,
    pub time_lost: f64,
    pub pit_stop: bool,
    pub consistency_variation: f64,
    pub consecutive_fast_laps: u32,
    pub mechanical_failure: bool,
    pub failure_component: Option<String>,
    pub car_performance: CarPerformance,
    pub is_new_tyre: bool,
    pub tyre_laps: u32,
}

impl LapResult {
    /// Fit a fresh set: the tyre state is reset and the fast lap streak ends.
    fn perform_pitstop(&mut self) {
        self.pit_stop = true;
        self.tyre_wear = 0.0;
        self.tyre_temperature = 0.0;
        self.tyre_condition = TyreCondition::Cold;
        self.consecutive_fast_laps = 0;
    }
}

/// LapEngine simulates single laps of a single car. It holds no state besides the compound
/// constants, everything lap-related is passed in and returned explicitly.
#[derive(Debug, Clone, Default)]
pub struct LapEngine {
    pub tyre_cfg: TyreConfig,
}

impl LapEngine {
    pub fn new(tyre_cfg: TyreConfig) -> LapEngine {
        LapEngine { tyre_cfg }
    }

    /// max_wear returns the wear at which the compound has to be replaced.
    pub fn max_wear(&self, tyre: TyreType) -> f64 {
        self.tyre_cfg.max_wear(tyre)
    }

    /// simulate_lap simulates lap `lap` (starting at 1) on the basis of the previous lap's state.
    ///
    /// 1. Mechanical failure roll, a failure ends the lap immediately
    /// 2. Tyre temperature
    /// 3. Consistency variation and tyre wear
    /// 4. Lap time
    /// 5. Fast lap streak and its heat feedback
    /// 6. Incident roll, possibly forcing a pit stop
    /// 7. Pit stop if the set is worn out
    #[allow(clippy::too_many_arguments)]
    pub fn simulate_lap<R: Rng + ?Sized>(
        &self,
        driver: &Driver,
        components: &[CarComponent],
        tyre: TyreType,
        track: TrackCondition,
        lap: u32,
        prev: &PreviousLap,
        rng: &mut R,
    ) -> Result<LapResult, LapSimError> {
        if lap == 0 {
            return Err(LapSimError::InvalidLapNumber(lap));
        }
        driver.validate()?;
        for component in components.iter() {
            component.validate()?;
        }
        prev.validate()?;

        let car_effect = calc_car_effect(components);
        let failure_risk =
            calc_mechanical_failure_risk(components, lap, prev.tot_no_laps, prev.incidents);
        let new_set = prev.pit_stop || prev.fresh_tyres;

        let mut result = LapResult {
            lap_time: 0.0,
            tyre_wear: prev.tyre_wear,
            tyre_temperature: prev.tyre_temperature,
            tyre_condition: prev.tyre_condition,
            incident: None,
            time_lost: 0.0,
            pit_stop: false,
            consistency_variation: 0.0,
            consecutive_fast_laps: prev.consecutive_fast_laps,
            mechanical_failure: false,
            failure_component: None,
            car_performance: car_effect.raw_performance,
            is_new_tyre: new_set,
            tyre_laps: prev.tyre_age,
        };

        if rng.gen::<f64>() < failure_risk {
            let incident = Incident::from(IncidentKind::MechanicalFailure);
            result.mechanical_failure = true;
            result.failure_component = determine_failed_component(components, rng);
            result.time_lost = T_MECHANICAL_FAILURE;
            result.incident = Some(incident);
            debug!(
                "Lap {}: mechanical failure ({}) at a risk of {:.3}",
                lap,
                result.failure_component.as_deref().unwrap_or("unknown part"),
                failure_risk
            );
            return Ok(result);
        }

        // tyre temperature
        let pars = self.tyre_cfg.for_compound(tyre);
        let thermal = calc_tyre_temperature(
            pars,
            track,
            &ThermalInputs {
                temperature: prev.tyre_temperature,
                condition: prev.tyre_condition,
                wear: prev.tyre_wear,
                new_set,
                last_lap_time: prev.last_lap_time,
            },
            rng,
        );
        result.tyre_temperature = thermal.temperature;
        result.tyre_condition = thermal.condition;

        // driver/car variation and tyre wear
        result.consistency_variation = calc_consistency_variation(
            driver.consistency,
            lap,
            prev.incidents,
            car_effect.consistency_bonus,
            rng,
        );
        result.tyre_wear = self.tyre_cfg.calc_tyre_wear(
            prev.tyre_wear,
            tyre,
            track,
            driver.skill,
            result.tyre_condition,
            prev.tyre_age,
            prev.last_lap_time,
            rng,
        );

        // lap time
        result.lap_time = calc_laptime(
            &LapTimeInputs {
                t_base: self.tyre_cfg.base_time(tyre, track),
                driver_skill: driver.skill,
                car_speed_bonus: car_effect.speed_bonus,
                tyre_wear: result.tyre_wear,
                temperature: result.tyre_temperature,
                condition: result.tyre_condition,
                consistency_variation: result.consistency_variation,
                new_set,
            },
            rng,
        );

        // fast lap streak: pushing on optimal, healthy tyres builds up heat
        if let Some(t_last) = prev.last_lap_time {
            let improvement = t_last - result.lap_time;

            result.consecutive_fast_laps = if improvement > FAST_LAP_IMPROVEMENT
                && result.tyre_condition == TyreCondition::Optimal
                && result.tyre_wear < 70.0
            {
                prev.consecutive_fast_laps + 1
            } else {
                0
            };

            if result.consecutive_fast_laps >= FAST_LAP_STREAK {
                let extra_heat = 5.0 + (result.consecutive_fast_laps - FAST_LAP_STREAK) as f64;
                result.tyre_temperature = (result.tyre_temperature + extra_heat).min(TEMP_MAX);
            }
        }

        // incidents
        let outcome = check_incidents(
            &IncidentInputs {
                tyre_wear: result.tyre_wear,
                driver_consistency: driver.consistency,
                tyre,
                track,
                condition: result.tyre_condition,
                consecutive_fast_laps: result.consecutive_fast_laps,
                tyre_age: prev.tyre_age,
                car_reliability: car_effect.raw_performance.reliability,
            },
            rng,
        );

        if let Some(incident) = outcome.incident {
            result.incident = Some(incident);
            result.time_lost = outcome.time_lost;
            result.lap_time += outcome.time_lost;
            debug!(
                "Lap {}: {} costs {:.3}s at {:.1}% wear",
                lap, incident.kind, outcome.time_lost, result.tyre_wear
            );

            if outcome.pit_stop {
                result.perform_pitstop();
            }
        }

        // worn out set
        if !result.pit_stop
            && (result.tyre_wear >= self.max_wear(tyre) || result.tyre_wear >= WEAR_PIT_CEILING)
        {
            result.perform_pitstop();
        }

        result.tyre_laps = if result.pit_stop { 0 } else { prev.tyre_age + 1 };
        result.is_new_tyre = false;

        debug!(
            "Lap {}: {:.3}s on {} ({:.1}% wear, {:.1}°C, {})",
            lap,
            result.lap_time,
            tyre,
            result.tyre_wear,
            result.tyre_temperature,
            result.tyre_condition
        );

        Ok(result)
    }
}
