use clap::Parser;
use lapsim::core::handle_race::handle_race;
use lapsim::core::lap::LapEngine;
use lapsim::core::qualifying::QualifyingEntry;
use lapsim::core::tireset::TyreConfig;
use lapsim::post::race_result::RaceResult;
use lapsim::pre::read_sim_pars::{read_sim_pars, read_tyre_config};
use lapsim::pre::sim_opts::SimOpts;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

/// Runs are spaced in seed space so that the per-entry seeds of different runs never overlap.
const RUN_SEED_STRIDE: u64 = 1 << 32;

/// EntryStats contains the statistics of one entry over all simulation runs.
#[derive(Debug, Clone, Default)]
struct EntryStats {
    finished_runs: u32,
    dnf_runs: u32,
    sum_race_time: f64,
    sum_pit_stops: u32,
    sum_incidents: u32,
}

fn collect_stats(results: &[RaceResult], no_entries: usize) -> Vec<EntryStats> {
    let mut stats = vec![EntryStats::default(); no_entries];

    for result in results.iter() {
        for (stat, car) in stats.iter_mut().zip(result.car_results.iter()) {
            if car.retired_on_lap.is_some() {
                stat.dnf_runs += 1;
            } else {
                stat.finished_runs += 1;
                stat.sum_race_time += car.race_time;
            }
            stat.sum_pit_stops += car.pit_stops;
            stat.sum_incidents += car.incidents;
        }
    }

    stats
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    let default_level = if sim_opts.debug { "debug" } else { "info" };
    let log_env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(log_env)
        .format_timestamp_secs()
        .try_init();

    // get simulation parameters
    println!(
        "INFO: Reading simulation parameters from {}",
        sim_opts.parfile_path.display()
    );
    let sim_pars = read_sim_pars(&sim_opts.parfile_path)?;

    let tyre_cfg = match &sim_opts.tyre_config {
        Some(path) => {
            println!("INFO: Reading tyre parameters from {}", path.display());
            read_tyre_config(path)?
        }
        None => TyreConfig::default(),
    };
    let engine = LapEngine::new(tyre_cfg);
    debug!("Tyre parameters: {:?}", engine.tyre_cfg);

    let seed = sim_opts
        .seed
        .or(sim_pars.race_pars.seed)
        .unwrap_or_else(rand::random::<u64>);

    // print race details
    println!(
        "INFO: Simulating {} laps on a {} track with {} entries (seed {})",
        sim_pars.race_pars.tot_no_laps,
        sim_pars.race_pars.track_condition,
        sim_pars.entries.len(),
        seed
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    // qualifying
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = engine.simulate_qualifying_session(
        &sim_pars.entries,
        sim_pars.race_pars.track_condition,
        &mut rng,
    )?;

    println!("RESULT: Qualifying");
    let t_pole = grid.first().map_or(0.0, |r| r.lap_time);
    for (pos, res) in grid.iter().enumerate() {
        println!(
            "{:2}. {:<20} {:<16} {:>8} {:8.3}s {:>+7.3}s",
            pos + 1,
            res.driver.name,
            res.team,
            res.tyre_type.as_str(),
            res.lap_time,
            res.lap_time - t_pole
        );
    }

    // race, entries start in qualifying order
    let race_entries: Vec<_> = grid
        .iter()
        .map(|r| QualifyingEntry {
            driver: r.driver.clone(),
            team: r.team.clone(),
            car_components: r.car_components.clone(),
            tyre_type: r.tyre_type,
        })
        .collect();

    let race_result = handle_race(&engine, &sim_pars.race_pars, &race_entries, seed)?;

    println!(
        "INFO: Execution time: {}ms",
        t_start.elapsed().as_millis()
    );

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_lap_times();
    race_result.print_classification();

    if let Some(csv_path) = &sim_opts.csv_out {
        let path = race_result.write_laps_csv(csv_path)?;
        println!("INFO: Lap data written to {}", path);
    }

    // MONTE CARLO RUNS ----------------------------------------------------------------------------
    if sim_opts.no_sim_runs > 1 {
        println!(
            "INFO: Running {} additional simulation runs...",
            sim_opts.no_sim_runs - 1
        );
        let t_start = Instant::now();

        let results = (1..sim_opts.no_sim_runs as u64)
            .into_par_iter()
            .map(|run| {
                handle_race(
                    &engine,
                    &sim_pars.race_pars,
                    &race_entries,
                    seed.wrapping_add(run.wrapping_mul(RUN_SEED_STRIDE)),
                )
            })
            .collect::<Result<Vec<RaceResult>, _>>()?;

        println!(
            "INFO: Execution time: {}ms",
            t_start.elapsed().as_millis()
        );

        let mut all_results = Vec::with_capacity(results.len() + 1);
        all_results.push(race_result);
        all_results.extend(results);
        let stats = collect_stats(&all_results, race_entries.len());

        println!("RESULT: Statistics over {} runs", all_results.len());
        for (entry, stat) in race_entries.iter().zip(stats.iter()) {
            let no_runs = (stat.finished_runs + stat.dnf_runs).max(1) as f64;
            let mean_race_time = if stat.finished_runs > 0 {
                format!("{:10.3}s", stat.sum_race_time / stat.finished_runs as f64)
            } else {
                format!("{:>11}", "-")
            };
            println!(
                "{:<20} mean race time: {}  DNF rate: {:5.1}%  pit stops: {:4.2}  \
                 incidents: {:4.2}",
                entry.driver.name,
                mean_race_time,
                stat.dnf_runs as f64 / no_runs * 100.0,
                stat.sum_pit_stops as f64 / no_runs,
                stat.sum_incidents as f64 / no_runs
            );
        }
    }

    Ok(())
}
