use crate::error::{check_rating, LapSimError};
use serde::{Deserialize, Serialize};

/// * `name` - Driver name, e.g. Valtteri Bottas (only used for output)
/// * `skill` - [0, 100] Raw pace of the driver
/// * `consistency` - [0, 100] Ability to repeat lap times, higher means less variation
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Driver {
    #[serde(default)]
    pub name: String,
    pub skill: f64,
    pub consistency: f64,
}

impl Driver {
    pub fn new(name: &str, skill: f64, consistency: f64) -> Result<Driver, LapSimError> {
        let driver = Driver {
            name: name.to_owned(),
            skill,
            consistency,
        };
        driver.validate()?;
        Ok(driver)
    }

    /// validate checks that skill and consistency are finite ratings within [0, 100].
    pub fn validate(&self) -> Result<(), LapSimError> {
        check_rating("skill", self.skill)?;
        check_rating("consistency", self.consistency)
    }
}
