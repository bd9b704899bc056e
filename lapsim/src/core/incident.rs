use crate::core::tireset::{TyreCondition, TyreType};
use crate::core::track::{is_wrong_tyre_for_conditions, TrackCondition};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wear at which every tyre has to be replaced, regardless of the compound.
pub const WEAR_PIT_CEILING: f64 = 140.0;
/// Laps on a fresh set during which incidents are ten times less likely.
const YOUNG_TYRE_LAPS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// IncidentKind lists all on-track events the engine knows. The last four are never drawn by
/// `generate_incident` but are handled by `requires_pit_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    WheelLock,
    TrackExcursion,
    MinorSpin,
    LossOfGrip,
    Spin,
    AeroDamage,
    BrakeProblem,
    SuspensionFailure,
    Puncture,
    TyreBurst,
    MajorMechanicalFailure,
    MechanicalFailure,
    TyreDestruction,
    AcceleratedDegradation,
    CriticalOverheating,
    SevereAquaplaning,
}

const MILD_INCIDENTS: [IncidentKind; 4] = [
    IncidentKind::WheelLock,
    IncidentKind::TrackExcursion,
    IncidentKind::MinorSpin,
    IncidentKind::LossOfGrip,
];

const MEDIUM_INCIDENTS: [IncidentKind; 4] = [
    IncidentKind::Spin,
    IncidentKind::AeroDamage,
    IncidentKind::BrakeProblem,
    IncidentKind::SuspensionFailure,
];

const SEVERE_INCIDENTS: [IncidentKind; 3] = [
    IncidentKind::Puncture,
    IncidentKind::TyreBurst,
    IncidentKind::MajorMechanicalFailure,
];

impl IncidentKind {
    pub fn severity(&self) -> Severity {
        match self {
            IncidentKind::WheelLock
            | IncidentKind::TrackExcursion
            | IncidentKind::MinorSpin
            | IncidentKind::LossOfGrip => Severity::Low,
            IncidentKind::Spin
            | IncidentKind::AeroDamage
            | IncidentKind::BrakeProblem
            | IncidentKind::SuspensionFailure
            | IncidentKind::AcceleratedDegradation
            | IncidentKind::CriticalOverheating => Severity::Medium,
            IncidentKind::Puncture
            | IncidentKind::TyreBurst
            | IncidentKind::MajorMechanicalFailure
            | IncidentKind::MechanicalFailure
            | IncidentKind::TyreDestruction
            | IncidentKind::SevereAquaplaning => Severity::High,
        }
    }

    /// base_time returns the (s) nominal time loss of the incident.
    pub fn base_time(&self) -> f64 {
        match self {
            IncidentKind::WheelLock => 1.0,
            IncidentKind::TrackExcursion => 1.5,
            IncidentKind::MinorSpin => 2.0,
            IncidentKind::LossOfGrip => 1.2,
            IncidentKind::Spin => 2.5,
            IncidentKind::AeroDamage => 3.0,
            IncidentKind::BrakeProblem => 4.0,
            IncidentKind::SuspensionFailure => 3.5,
            IncidentKind::Puncture => 25.0,
            IncidentKind::TyreBurst => 35.0,
            IncidentKind::MajorMechanicalFailure => 30.0,
            IncidentKind::MechanicalFailure => 30.0,
            IncidentKind::TyreDestruction => 30.0,
            IncidentKind::AcceleratedDegradation => 3.0,
            IncidentKind::CriticalOverheating => 4.0,
            IncidentKind::SevereAquaplaning => 8.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IncidentKind::WheelLock => "Wheel lock-up",
            IncidentKind::TrackExcursion => "Off track",
            IncidentKind::MinorSpin => "Minor spin",
            IncidentKind::LossOfGrip => "Loss of grip",
            IncidentKind::Spin => "Spin",
            IncidentKind::AeroDamage => "Aero damage",
            IncidentKind::BrakeProblem => "Brake problems",
            IncidentKind::SuspensionFailure => "Suspension failure",
            IncidentKind::Puncture => "Puncture",
            IncidentKind::TyreBurst => "Tyre blowout",
            IncidentKind::MajorMechanicalFailure => "Major mechanical failure",
            IncidentKind::MechanicalFailure => "Mechanical failure",
            IncidentKind::TyreDestruction => "Tyre destroyed",
            IncidentKind::AcceleratedDegradation => "Accelerated degradation",
            IncidentKind::CriticalOverheating => "Critical overheating",
            IncidentKind::SevereAquaplaning => "Severe aquaplaning",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// * `kind` - What happened
/// * `severity` - Severity class of the incident
/// * `base_time` - (s) Nominal time loss
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub kind: IncidentKind,
    pub severity: Severity,
    pub base_time: f64,
}

impl From<IncidentKind> for Incident {
    fn from(kind: IncidentKind) -> Self {
        Incident {
            kind,
            severity: kind.severity(),
            base_time: kind.base_time(),
        }
    }
}

/// Lap state relevant for the incident probability.
#[derive(Debug, Clone, Copy)]
pub struct IncidentInputs {
    pub tyre_wear: f64,
    pub driver_consistency: f64,
    pub tyre: TyreType,
    pub track: TrackCondition,
    pub condition: TyreCondition,
    pub consecutive_fast_laps: u32,
    pub tyre_age: u32,
    pub car_reliability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IncidentOutcome {
    pub incident: Option<Incident>,
    pub time_lost: f64,
    pub pit_stop: bool,
}

/// calc_incident_chance returns the (%) probability of an incident in this lap.
///
/// A base chance from the wear table is reduced by 0.1% per reliability point above 50 (and raised
/// below), cut to a tenth on a young set, multiplied by all applicable risk factors and by
/// 1 + (100 - consistency) / 100. The result is limited to [0, 100].
pub fn calc_incident_chance(inputs: &IncidentInputs) -> f64 {
    let wear = inputs.tyre_wear;

    let wear_chance = if wear > 130.0 {
        40.0
    } else if wear > 120.0 {
        28.0
    } else if wear > 110.0 {
        20.0
    } else if wear > 100.0 {
        12.0
    } else if wear > 90.0 {
        6.0
    } else if wear > 80.0 {
        3.0
    } else if wear > 70.0 {
        1.5
    } else {
        0.0
    };

    let reliability_reduction = (inputs.car_reliability - 50.0) * 0.1;
    let mut base_chance = (wear_chance - reliability_reduction).max(0.0);

    if inputs.tyre_age < YOUNG_TYRE_LAPS {
        base_chance *= 0.1;
    }

    let mut risk_factor = 1.0;
    if is_wrong_tyre_for_conditions(inputs.tyre, inputs.track) {
        risk_factor *= 2.0;
    }
    match inputs.condition {
        TyreCondition::Cold => risk_factor *= 1.5,
        TyreCondition::Overheating => risk_factor *= 2.0,
        _ => (),
    }
    if inputs.consecutive_fast_laps >= 3 {
        risk_factor *= 1.5;
    }
    if wear > 100.0 {
        risk_factor *= 1.0 + (wear - 100.0) * 0.05;
    }

    let consistency_factor = 1.0 + (100.0 - inputs.driver_consistency) / 100.0;

    (base_chance * risk_factor * consistency_factor).clamp(0.0, 100.0)
}

/// check_incidents rolls for an incident and, if one happens, determines its time loss and whether
/// it forces a pit stop.
pub fn check_incidents<R: Rng + ?Sized>(inputs: &IncidentInputs, rng: &mut R) -> IncidentOutcome {
    let chance = calc_incident_chance(inputs);

    if rng.gen::<f64>() * 100.0 >= chance {
        return IncidentOutcome::default();
    }

    let incident = generate_incident(inputs.tyre_wear, inputs.car_reliability, rng);
    IncidentOutcome {
        incident: Some(incident),
        time_lost: calc_time_lost(&incident, rng),
        pit_stop: requires_pit_stop(&incident, inputs.tyre_wear),
    }
}

/// incident_pool returns the incidents that can happen at the given wear and reliability. Severe
/// incidents are only possible on worn tyres (> 90%) of unreliable cars (< 70). `grave_roll` is
/// only consulted beyond 100% wear on cars below 60 reliability.
fn incident_pool<R: Rng + ?Sized>(
    tyre_wear: f64,
    car_reliability: f64,
    rng: &mut R,
) -> Vec<IncidentKind> {
    let mut available: Vec<IncidentKind> = MILD_INCIDENTS
        .iter()
        .chain(MEDIUM_INCIDENTS.iter())
        .copied()
        .collect();

    if tyre_wear > 90.0 && car_reliability < 70.0 {
        available.extend_from_slice(&SEVERE_INCIDENTS);
    }

    let pool: Vec<IncidentKind> = if tyre_wear < 50.0 {
        available
            .into_iter()
            .filter(|k| k.severity() == Severity::Low)
            .collect()
    } else if tyre_wear < 80.0 {
        available
            .into_iter()
            .filter(|k| k.severity() != Severity::High)
            .collect()
    } else if tyre_wear > 100.0 && car_reliability < 60.0 {
        let grave_probability = ((tyre_wear - 100.0) * 0.02).min(0.6);
        if rng.gen::<f64>() < grave_probability {
            available
                .into_iter()
                .filter(|k| k.severity() == Severity::High)
                .collect()
        } else {
            available
                .into_iter()
                .filter(|k| k.severity() != Severity::Low)
                .collect()
        }
    } else {
        available
    };

    if pool.is_empty() {
        MILD_INCIDENTS.to_vec()
    } else {
        pool
    }
}

/// generate_incident draws an incident uniformly from the pool that is possible at the given wear
/// and reliability.
pub fn generate_incident<R: Rng + ?Sized>(
    tyre_wear: f64,
    car_reliability: f64,
    rng: &mut R,
) -> Incident {
    let pool = incident_pool(tyre_wear, car_reliability, rng);
    let idx = ((rng.gen::<f64>() * pool.len() as f64) as usize).min(pool.len() - 1);
    Incident::from(pool[idx])
}

/// requires_pit_stop checks whether the incident forces the car into the pits:
///
/// * punctures, blowouts and destroyed tyres always do
/// * accelerated degradation above 90%, critical overheating above 100% and severe aquaplaning
///   above 80% wear do
/// * any tyre at 140% wear or more does
pub fn requires_pit_stop(incident: &Incident, tyre_wear: f64) -> bool {
    let forced_by_kind = match incident.kind {
        IncidentKind::Puncture | IncidentKind::TyreBurst | IncidentKind::TyreDestruction => true,
        IncidentKind::AcceleratedDegradation => tyre_wear > 90.0,
        IncidentKind::CriticalOverheating => tyre_wear > 100.0,
        IncidentKind::SevereAquaplaning => tyre_wear > 80.0,
        _ => false,
    };

    forced_by_kind || tyre_wear >= WEAR_PIT_CEILING
}

/// calc_time_lost returns the (s) time lost by the incident, between 100% and 140% of its nominal
/// time.
pub fn calc_time_lost<R: Rng + ?Sized>(incident: &Incident, rng: &mut R) -> f64 {
    incident.base_time + rng.gen::<f64>() * incident.base_time * 0.4
}
