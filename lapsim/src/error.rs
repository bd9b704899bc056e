use thiserror::Error;

/// LapSimError is returned if an input to the engine does not fulfill the posed requirements,
/// e.g. a driver skill outside [0, 100] or an unknown tyre type string.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LapSimError {
    #[error("{field} must be within [0, 100], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("tyre wear must not be negative, got {0}")]
    NegativeWear(f64),

    #[error("lap numbers start at 1, got lap {0}")]
    InvalidLapNumber(u32),

    #[error("a race needs at least one lap")]
    NoLaps,

    #[error("a race has at most {max} laps, got {value}")]
    TooManyLaps { max: u32, value: u32 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("optimal temperature window [{min}, {max}] is empty")]
    InvalidTemperatureWindow { min: f64, max: f64 },

    #[error("unknown tyre type '{0}'")]
    UnknownTyreType(String),

    #[error("unknown track condition '{0}'")]
    UnknownTrackCondition(String),
}

/// check_rating ensures that a 0-100 rating (skill, consistency, strength, reliability) is valid.
pub(crate) fn check_rating(field: &'static str, value: f64) -> Result<(), LapSimError> {
    if !value.is_finite() {
        return Err(LapSimError::NotFinite { field, value });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(LapSimError::OutOfRange { field, value });
    }
    Ok(())
}
