use crate::core::handle_race::RacePars;
use crate::core::qualifying::QualifyingEntry;
use crate::core::tireset::TyreConfig;
use crate::error::LapSimError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs.
#[derive(Debug, Deserialize, Clone)]
pub struct SimPars {
    pub race_pars: RacePars,
    pub entries: Vec<QualifyingEntry>,
}

impl SimPars {
    /// validate checks the decoded parameters before any lap is simulated.
    pub fn validate(&self) -> Result<(), LapSimError> {
        self.race_pars.validate()?;
        for entry in self.entries.iter() {
            entry.driver.validate()?;
            for component in entry.car_components.iter() {
                component.validate()?;
            }
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(filepath: &Path, description: &str) -> anyhow::Result<T> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open {} file {}!",
            description,
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse {} file {}!",
        description,
        filepath.display()
    ))?;
    Ok(pars)
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let pars: SimPars = read_json(filepath, "parameter")?;
    pars.validate()
        .context(format!("Invalid parameters in {}!", filepath.display()))?;
    Ok(pars)
}

/// read_tyre_config reads per-compound tyre parameters. Compounds missing in the file keep their
/// default parameters.
pub fn read_tyre_config(filepath: &Path) -> anyhow::Result<TyreConfig> {
    let tyre_cfg: TyreConfig = read_json(filepath, "tyre config")?;
    tyre_cfg
        .validate()
        .context(format!("Invalid tyre parameters in {}!", filepath.display()))?;
    Ok(tyre_cfg)
}
