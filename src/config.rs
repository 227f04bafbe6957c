use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of individuals sampled per generation.
    pub population_size: usize,
    /// Starting frequency of the dominant allele, in [0, 1].
    pub initial_frequency: f64,
    /// Hard cap on simulated generations per trial.
    pub generations: usize,
    /// Number of independent trials in a batch.
    pub n_trials: usize,

    /// Master seed for the batch. Drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Write the first trial's trajectory as a tab-separated log.
    #[serde(default)]
    pub trial_log: bool,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.population_size, 1..1_000_000).context("invalid population size")?;
        check_num(self.initial_frequency, 0.0..=1.0).context("invalid initial frequency")?;
        check_num(self.generations, 1..1_000_000).context("invalid number of generations")?;
        check_num(self.n_trials, 1..100_000).context("invalid number of trials")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
