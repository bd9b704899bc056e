use approx::assert_abs_diff_eq;
use lapsim::core::car::{calc_mechanical_failure_risk, CarComponent, MAX_FAILURE_RISK};
use lapsim::core::driver::Driver;
use lapsim::core::incident::{generate_incident, Severity};
use lapsim::core::lap::{LapEngine, LapResult, PreviousLap};
use lapsim::core::laptime::calc_wear_penalty;
use lapsim::core::qualifying::QualifyingEntry;
use lapsim::core::tireset::{TyreCondition, TyreType};
use lapsim::core::track::TrackCondition;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn driver(name: &str, skill: f64, consistency: f64) -> Driver {
    Driver::new(name, skill, consistency).unwrap()
}

fn car(strength: f64, reliability: f64) -> Vec<CarComponent> {
    vec![
        CarComponent::new("engine", strength, reliability),
        CarComponent::new("gearbox", strength, reliability),
        CarComponent::new("suspension", strength, reliability),
    ]
}

/// Drives `tot_no_laps` laps, stopping at a mechanical failure.
fn run_stint<R: Rng>(
    engine: &LapEngine,
    tyre: TyreType,
    track: TrackCondition,
    tot_no_laps: u32,
    rng: &mut R,
) -> Vec<LapResult> {
    let driver = driver("Stint", 75.0, 65.0);
    let components = car(70.0, 85.0);
    let mut prev = PreviousLap::race_start(tot_no_laps);
    let mut results = Vec::new();

    for lap in 1..=tot_no_laps {
        let result = engine
            .simulate_lap(&driver, &components, tyre, track, lap, &prev, rng)
            .unwrap();
        let failed = result.mechanical_failure;
        prev = prev.advance(&result);
        results.push(result);
        if failed {
            break;
        }
    }

    results
}

#[test]
fn same_seed_replays_identical_laps() {
    let engine = LapEngine::default();

    let a = run_stint(
        &engine,
        TyreType::Medium,
        TrackCondition::LightRain,
        50,
        &mut StdRng::seed_from_u64(2024),
    );
    let b = run_stint(
        &engine,
        TyreType::Medium,
        TrackCondition::LightRain,
        50,
        &mut StdRng::seed_from_u64(2024),
    );

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn pit_stop_always_resets_the_tyre_state() {
    let engine = LapEngine::default();
    let mut no_pit_stops = 0;

    for seed in 0..20 {
        let results = run_stint(
            &engine,
            TyreType::Soft,
            TrackCondition::Dry,
            60,
            &mut StdRng::seed_from_u64(seed),
        );
        for res in results.iter().filter(|r| r.pit_stop) {
            no_pit_stops += 1;
            assert_eq!(res.tyre_wear, 0.0);
            assert_eq!(res.tyre_temperature, 0.0);
            assert_eq!(res.tyre_condition, TyreCondition::Cold);
            assert_eq!(res.consecutive_fast_laps, 0);
            assert_eq!(res.tyre_laps, 0);
        }
    }

    assert!(no_pit_stops > 0);
}

#[test]
fn mechanical_failure_leaves_the_tyres_untouched() {
    let engine = LapEngine::default();
    let prev = PreviousLap {
        tyre_wear: 37.5,
        tyre_temperature: 70.0,
        tyre_condition: TyreCondition::Optimal,
        fresh_tyres: false,
        tyre_age: 9,
        last_lap_time: Some(78.2),
        ..PreviousLap::default()
    };

    // a constant draw of 0 is below any failure risk
    let result = engine
        .simulate_lap(
            &driver("Unlucky", 60.0, 60.0),
            &car(60.0, 40.0),
            TyreType::Hard,
            TrackCondition::Dry,
            12,
            &prev,
            &mut StepRng::new(0, 0),
        )
        .unwrap();

    assert!(result.mechanical_failure);
    assert!(result.failure_component.is_some());
    assert_eq!(result.tyre_wear, 37.5);
    assert_eq!(result.tyre_temperature, 70.0);
    assert_eq!(result.time_lost, 30.0);
    assert_eq!(result.lap_time, 0.0);
    assert_eq!(result.incident.map(|i| i.severity), Some(Severity::High));
}

#[test]
fn worn_out_set_is_replaced() {
    let engine = LapEngine::default();
    let prev = PreviousLap {
        tyre_wear: 145.0,
        tyre_temperature: 80.0,
        tyre_condition: TyreCondition::Optimal,
        fresh_tyres: false,
        tyre_age: 30,
        last_lap_time: Some(80.0),
        ..PreviousLap::default()
    };

    for tyre in TyreType::ALL.iter() {
        for seed in 0..10 {
            let result = engine
                .simulate_lap(
                    &driver("Worn", 70.0, 70.0),
                    &car(70.0, 100.0),
                    *tyre,
                    TrackCondition::Dry,
                    31,
                    &prev,
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
            if result.mechanical_failure {
                continue;
            }
            assert!(result.pit_stop);
            assert_eq!(result.tyre_wear, 0.0);
        }
    }
}

#[test]
fn first_lap_scenario() {
    let engine = LapEngine::default();

    // 0.5 draws stay above the failure risk and the incident chance of a fresh set
    let result = engine
        .simulate_lap(
            &driver("Scenario", 80.0, 80.0),
            &[CarComponent::new("chassis", 80.0, 90.0)],
            TyreType::Soft,
            TrackCondition::Dry,
            1,
            &PreviousLap::default(),
            &mut StepRng::new(1 << 63, 0),
        )
        .unwrap();

    assert!(!result.mechanical_failure);
    assert!(result.incident.is_none());
    assert!(result.lap_time > 60.0 && result.lap_time < 76.0);
    assert!(result.tyre_wear > 0.5 && result.tyre_wear < 5.0);
    assert!(matches!(
        result.tyre_condition,
        TyreCondition::Cold | TyreCondition::Warming
    ));
}

#[test]
fn qualifying_is_sorted_permutation_of_entries() {
    let engine = LapEngine::default();
    let entries: Vec<QualifyingEntry> = (0..12)
        .map(|i| QualifyingEntry {
            driver: driver(&format!("Driver {}", i), 50.0 + 4.0 * i as f64, 90.0 - 3.0 * i as f64),
            team: format!("Team {}", i / 2),
            car_components: car(40.0 + 5.0 * (i % 5) as f64, 80.0),
            tyre_type: if i % 3 == 0 {
                TyreType::Soft
            } else {
                TyreType::Medium
            },
        })
        .collect();

    let results = engine
        .simulate_qualifying_session(&entries, TrackCondition::Dry, &mut StdRng::seed_from_u64(5))
        .unwrap();

    assert_eq!(results.len(), entries.len());
    for pair in results.windows(2) {
        assert!(pair[0].lap_time <= pair[1].lap_time);
    }

    let mut names_in: Vec<&str> = entries.iter().map(|e| e.driver.name.as_str()).collect();
    let mut names_out: Vec<&str> = results.iter().map(|r| r.driver.name.as_str()).collect();
    names_in.sort_unstable();
    names_out.sort_unstable();
    assert_eq!(names_in, names_out);
}

#[test]
fn severe_incidents_need_worn_tyres_and_a_fragile_car() {
    let mut rng = StdRng::seed_from_u64(77);

    let fragile: Vec<Severity> = (0..2000)
        .map(|_| generate_incident(95.0, 20.0, &mut rng).severity)
        .collect();
    assert!(fragile.contains(&Severity::High));

    let solid: Vec<Severity> = (0..2000)
        .map(|_| generate_incident(95.0, 80.0, &mut rng).severity)
        .collect();
    assert!(!solid.contains(&Severity::High));
}

#[test]
fn failure_risk_stays_bounded() {
    for reliability in [0.0, 20.0, 50.0, 90.0, 100.0].iter() {
        for incidents in 0..12 {
            for cur_lap in [1, 30, 60, 120].iter() {
                let risk = calc_mechanical_failure_risk(
                    &car(50.0, *reliability),
                    *cur_lap,
                    60,
                    incidents,
                );
                assert!((0.0..=MAX_FAILURE_RISK).contains(&risk));
            }
        }
    }
}

#[test]
fn wear_penalty_is_non_decreasing() {
    let mut last = calc_wear_penalty(0.0);
    for i in 1..=1600 {
        let penalty = calc_wear_penalty(i as f64 * 0.1);
        assert!(penalty >= last);
        last = penalty;
    }
    assert_abs_diff_eq!(calc_wear_penalty(40.0), 1.0, epsilon = 1e-9);
}
