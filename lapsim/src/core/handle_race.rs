use crate::core::car::CarStatus;
use crate::core::lap::{LapEngine, PreviousLap};
use crate::core::qualifying::QualifyingEntry;
use crate::core::track::{is_wrong_tyre_for_conditions, TrackCondition};
use crate::error::LapSimError;
use crate::post::race_result::{CarResult, LapRecord, RaceResult};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Longest race distance accepted from a parameter file.
pub const MAX_TOT_NO_LAPS: u32 = 1000;

fn default_t_pit_stop() -> f64 {
    22.0
}

/// * `tot_no_laps` - Race distance in laps
/// * `track_condition` - Track condition during the whole race
/// * `t_pit_stop` - (s) Time lost per pit stop (pit lane and standstill)
/// * `seed` - Seed of the random source, a random seed is drawn if not set
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RacePars {
    pub tot_no_laps: u32,
    pub track_condition: TrackCondition,
    #[serde(default = "default_t_pit_stop")]
    pub t_pit_stop: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RacePars {
    pub fn validate(&self) -> Result<(), LapSimError> {
        if self.tot_no_laps == 0 {
            return Err(LapSimError::NoLaps);
        }
        if self.tot_no_laps > MAX_TOT_NO_LAPS {
            return Err(LapSimError::TooManyLaps {
                max: MAX_TOT_NO_LAPS,
                value: self.tot_no_laps,
            });
        }
        if !self.t_pit_stop.is_finite() || self.t_pit_stop < 0.0 {
            return Err(LapSimError::OutOfRange {
                field: "t_pit_stop",
                value: self.t_pit_stop,
            });
        }
        Ok(())
    }
}

/// handle_race simulates the race of every entry and returns the results in entry order. Entries
/// do not interact: each one drives its own laps with its own random source derived from `seed`,
/// so the result of an entry does not depend on the other entries.
pub fn handle_race(
    engine: &LapEngine,
    race_pars: &RacePars,
    entries: &[QualifyingEntry],
    seed: u64,
) -> Result<RaceResult, LapSimError> {
    race_pars.validate()?;

    let mut car_results = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
        car_results.push(simulate_car_race(engine, race_pars, entry, &mut rng)?);
    }

    Ok(RaceResult {
        tot_no_laps: race_pars.tot_no_laps,
        track_condition: race_pars.track_condition,
        car_results,
    })
}

/// simulate_car_race drives one entry through the whole race. After a pit stop the car keeps its
/// compound unless it does not suit the track, in which case the appropriate one is fitted. A
/// mechanical failure retires the car.
pub fn simulate_car_race<R: Rng + ?Sized>(
    engine: &LapEngine,
    race_pars: &RacePars,
    entry: &QualifyingEntry,
    rng: &mut R,
) -> Result<CarResult, LapSimError> {
    let track = race_pars.track_condition;
    let mut tyre = entry.tyre_type;

    if is_wrong_tyre_for_conditions(tyre, track) {
        warn!(
            "{} starts on {} tyres on a {} track",
            entry.driver.name, tyre, track
        );
    }

    let mut car_result = CarResult {
        driver_name: entry.driver.name.to_owned(),
        team: entry.team.to_owned(),
        status: CarStatus::Running,
        laps: Vec::new(),
        race_time: 0.0,
        pit_stops: 0,
        incidents: 0,
        retired_on_lap: None,
        fastest_lap: None,
    };
    let mut prev = PreviousLap::race_start(race_pars.tot_no_laps);

    for lap in 1..=race_pars.tot_no_laps {
        let result = engine.simulate_lap(
            &entry.driver,
            &entry.car_components,
            tyre,
            track,
            lap,
            &prev,
            rng,
        )?;
        let tyre_used = tyre;

        if result.mechanical_failure {
            info!(
                "{} retired on lap {} ({} failure)",
                entry.driver.name,
                lap,
                result.failure_component.as_deref().unwrap_or("unknown")
            );
            car_result.status = CarStatus::DNF;
            car_result.retired_on_lap = Some(lap);
            car_result.incidents += 1;
            car_result.laps.push(LapRecord {
                lap,
                tyre_type: tyre_used,
                result,
            });
            break;
        }

        car_result.race_time += result.lap_time;
        if result.incident.is_some() {
            car_result.incidents += 1;
        }

        match car_result.fastest_lap {
            Some((_, t_fastest)) if t_fastest <= result.lap_time => (),
            _ => car_result.fastest_lap = Some((lap, result.lap_time)),
        }

        if result.pit_stop {
            car_result.pit_stops += 1;
            car_result.race_time += race_pars.t_pit_stop;

            if is_wrong_tyre_for_conditions(tyre, track) {
                tyre = track.appropriate_tyre();
            }
            info!(
                "{} pits on lap {} ({}), fits {} tyres",
                entry.driver.name,
                lap,
                result.incident.map_or("worn out", |i| i.kind.label()),
                tyre
            );
        }

        prev = prev.advance(&result);
        car_result.laps.push(LapRecord {
            lap,
            tyre_type: tyre_used,
            result,
        });
    }

    Ok(car_result)
}
