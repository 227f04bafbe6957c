//! Simulation data types.

use serde::{Deserialize, Serialize};

/// The two alleles at the simulated locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allele {
    Dominant,
    Recessive,
}

/// Frequency of the dominant allele at a single generation of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub generation: usize,
    pub frequency: f64,
}

/// Generation-by-generation frequency record of one trial.
///
/// Starts at generation 0 with the initial frequency and never holds more
/// than the configured number of generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn with_capacity(n_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n_samples),
        }
    }

    pub fn push(&mut self, generation: usize, frequency: f64) {
        self.samples.push(Sample {
            generation,
            frequency,
        });
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Frequency of the last recorded sample, or `None` for an empty trajectory.
    pub fn last_frequency(&self) -> Option<f64> {
        self.samples.last().map(|sample| sample.frequency)
    }
}

/// Outcome of one trial.
///
/// `fixation_generation` is the generation at which the frequency first hit
/// exactly 0.0 or 1.0, or the generation cap if the trial never fixed.
/// `fixed_allele` is `None` only in the capped case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub fixation_generation: usize,
    pub fixed_allele: Option<Allele>,
}
