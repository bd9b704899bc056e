use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "lapsim",
    about = "A stochastic lap-by-lap race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs, runs after the first one are only evaluated statistically
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file
    #[clap(short, long)]
    pub parfile_path: PathBuf,

    /// Set path to a tyre compound parameter file (OPTIONAL: built-in compounds otherwise)
    #[clap(short, long)]
    pub tyre_config: Option<PathBuf>,

    /// Set seed of the random source (OPTIONAL: overrides the seed in the parameter file)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set path of a CSV file receiving every simulated lap of the first run
    #[clap(short, long)]
    pub csv_out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arguments() {
        let opts = SimOpts::parse_from([
            "lapsim-cli",
            "-p",
            "input/race.json",
            "--seed",
            "42",
            "-n",
            "100",
        ]);
        assert_eq!(opts.parfile_path, PathBuf::from("input/race.json"));
        assert_eq!(opts.seed, Some(42));
        assert_eq!(opts.no_sim_runs, 100);
        assert!(!opts.debug);
        assert!(opts.tyre_config.is_none());
    }
}
