use crate::core::car::CarStatus;
use crate::core::lap::LapResult;
use crate::core::tireset::TyreType;
use crate::core::track::TrackCondition;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// LapRecord is a simulated lap together with the compound it was driven on.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LapRecord {
    pub lap: u32,
    pub tyre_type: TyreType,
    pub result: LapResult,
}

/// CarResult contains the race of a single entry.
///
/// * `race_time` - (s) Sum of all lap times and pit stop losses
/// * `incidents` - Incidents including a lap-ending mechanical failure
/// * `fastest_lap` - Lap number and (s) lap time of the fastest lap
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CarResult {
    pub driver_name: String,
    pub team: String,
    pub status: CarStatus,
    pub laps: Vec<LapRecord>,
    pub race_time: f64,
    pub pit_stops: u32,
    pub incidents: u32,
    pub retired_on_lap: Option<u32>,
    pub fastest_lap: Option<(u32, f64)>,
}

impl CarResult {
    pub fn completed_laps(&self) -> u32 {
        self.laps
            .iter()
            .filter(|l| !l.result.mechanical_failure)
            .count() as u32
    }
}

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RaceResult {
    pub tot_no_laps: u32,
    pub track_condition: TrackCondition,
    pub car_results: Vec<CarResult>,
}

/// Flat CSV row of a single lap.
#[derive(Debug, Serialize)]
struct LapRow<'a> {
    driver: &'a str,
    team: &'a str,
    lap: u32,
    tyre_type: TyreType,
    lap_time: f64,
    tyre_wear: f64,
    tyre_temperature: f64,
    tyre_condition: &'a str,
    incident: &'a str,
    time_lost: f64,
    pit_stop: bool,
    mechanical_failure: bool,
    failure_component: &'a str,
}

fn lap_cell(car: &CarResult, lap: u32) -> String {
    let record = car
        .laps
        .get(lap as usize - 1)
        .filter(|l| !l.result.mechanical_failure);

    match record {
        Some(l) => {
            let mark = if l.result.pit_stop {
                "P"
            } else if l.result.incident.is_some() {
                "!"
            } else {
                " "
            };
            format!("{:8.3}s{}", l.result.lap_time, mark)
        }
        None => format!("{:>10}", "-"),
    }
}

impl RaceResult {
    /// get_classification returns the entry indices in finishing order: finishers by race time,
    /// then retired cars by the number of completed laps.
    pub fn get_classification(&self) -> Vec<usize> {
        let mut idxs: Vec<usize> = (0..self.car_results.len()).collect();
        idxs.sort_by(|&a, &b| {
            let (car_a, car_b) = (&self.car_results[a], &self.car_results[b]);
            car_b
                .completed_laps()
                .cmp(&car_a.completed_laps())
                .then(
                    car_a
                        .race_time
                        .partial_cmp(&car_b.race_time)
                        .unwrap_or(Ordering::Equal),
                )
        });
        idxs
    }

    /// format_lap_times returns the lap time table of all entries, one row per lap. Laps an entry
    /// did not complete are marked with "-".
    pub fn format_lap_times(&self) -> String {
        let header: Vec<String> = self
            .car_results
            .iter()
            .map(|car| format!("{:>10}", car.driver_name))
            .collect();

        let mut table = format!("lap, {}\n", header.join(", "));
        for lap in 1..=self.tot_no_laps {
            let cells: Vec<String> = self
                .car_results
                .iter()
                .map(|car| lap_cell(car, lap))
                .collect();
            table.push_str(&format!("{:3}, {}\n", lap, cells.join(", ")));
        }
        table
    }

    /// print_lap_times prints the lap time table to the console output.
    pub fn print_lap_times(&self) {
        println!(
            "RESULT: Lap times ({} track, P = pit stop, ! = incident)",
            self.track_condition
        );
        println!("{}", self.format_lap_times());
    }

    /// print_classification prints the final classification to the console output.
    pub fn print_classification(&self) {
        println!("RESULT: Classification");
        for (pos, idx) in self.get_classification().into_iter().enumerate() {
            let car = &self.car_results[idx];
            let time = match car.retired_on_lap {
                Some(lap) => format!("DNF (lap {})", lap),
                None => format!("{:10.3}s", car.race_time),
            };
            let fastest = car
                .fastest_lap
                .map_or_else(|| "-".to_owned(), |(lap, t)| format!("{:.3}s (lap {})", t, lap));
            println!(
                "{:2}. {:<20} {:<16} {:>16}  pit stops: {}  incidents: {}  fastest: {}",
                pos + 1,
                car.driver_name,
                car.team,
                time,
                car.pit_stops,
                car.incidents,
                fastest
            );
        }
    }

    /// write_laps_csv writes every simulated lap of every entry to a CSV file and returns the path
    /// of the written file.
    pub fn write_laps_csv(&self, path: &Path) -> anyhow::Result<String> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .context(format!("Failed to create output directory {}!", dir.display()))?;
        }
        let mut wtr = csv::Writer::from_path(path)
            .context(format!("Failed to open output file {}!", path.display()))?;

        for car in self.car_results.iter() {
            for record in car.laps.iter() {
                let res = &record.result;
                wtr.serialize(LapRow {
                    driver: &car.driver_name,
                    team: &car.team,
                    lap: record.lap,
                    tyre_type: record.tyre_type,
                    lap_time: res.lap_time,
                    tyre_wear: res.tyre_wear,
                    tyre_temperature: res.tyre_temperature,
                    tyre_condition: res.tyre_condition.as_str(),
                    incident: res.incident.map_or("", |i| i.kind.label()),
                    time_lost: res.time_lost,
                    pit_stop: res.pit_stop,
                    mechanical_failure: res.mechanical_failure,
                    failure_component: res.failure_component.as_deref().unwrap_or(""),
                })
                .context("Failed to write lap to CSV file!")?;
            }
        }
        wtr.flush()?;

        Ok(path.to_string_lossy().into_owned())
    }
}
