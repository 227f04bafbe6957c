use crate::model::{Trajectory, TrialOutcome};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Streaming accumulator for fixation times (Welford update).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    /// Arithmetic mean, or 0.0 when no value was added.
    pub fn mean(&self) -> f64 {
        if self.n_vals == 0 { 0.0 } else { self.mean }
    }

    /// Population standard deviation (divide by count, not count - 1),
    /// or 0.0 when no value was added.
    pub fn std_dev(&self) -> f64 {
        if self.n_vals == 0 {
            0.0
        } else {
            (self.diff_2_sum / self.n_vals as f64).sqrt()
        }
    }
}

/// Aggregate fixation statistics of a batch.
///
/// Classification is binary on each trajectory's last recorded frequency:
/// exactly 1.0 counts as a dominant fixation, anything else as a recessive
/// one. A trial that hit the generation cap therefore lands in the recessive
/// bucket even though its [`TrialOutcome`] records no fixed allele.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub n_trials: usize,
    pub fixation_dominant: usize,
    pub fixation_recessive: usize,
    /// Mean of the strictly positive fixation generations. Capped trials
    /// contribute the cap value.
    pub mean_fixation_time: f64,
    pub std_dev_fixation_time: f64,
}

impl BatchStatistics {
    pub fn from_batch(
        trajectories: &[Trajectory],
        outcomes: &[TrialOutcome],
        n_trials: usize,
    ) -> Self {
        let mut fixation_dominant = 0;
        let mut fixation_recessive = 0;
        for (trial_idx, trajectory) in trajectories.iter().enumerate() {
            match trajectory.last_frequency() {
                None => log::warn!("trial {trial_idx} recorded no samples, excluded from counts"),
                Some(frequency) if frequency == 1.0 => fixation_dominant += 1,
                Some(_) => fixation_recessive += 1,
            }
        }

        let mut acc = Accumulator::new();
        for outcome in outcomes {
            if outcome.fixation_generation > 0 {
                acc.add(outcome.fixation_generation as f64);
            }
        }

        Self {
            n_trials,
            fixation_dominant,
            fixation_recessive,
            mean_fixation_time: acc.mean(),
            std_dev_fixation_time: acc.std_dev(),
        }
    }

    pub fn percent_dominant(&self) -> f64 {
        100.0 * self.fixation_dominant as f64 / self.n_trials as f64
    }

    pub fn percent_recessive(&self) -> f64 {
        100.0 * self.fixation_recessive as f64 / self.n_trials as f64
    }

    /// Write the human-readable batch summary.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "=== Batch Statistics ===")?;
        writeln!(out, "Total trials: {}", self.n_trials)?;
        writeln!(
            out,
            "Fixation of the dominant allele: {} ({:.1}%)",
            self.fixation_dominant,
            self.percent_dominant()
        )?;
        writeln!(
            out,
            "Fixation of the recessive allele: {} ({:.1}%)",
            self.fixation_recessive,
            self.percent_recessive()
        )?;
        writeln!(
            out,
            "Mean fixation time: {:.4} generations",
            self.mean_fixation_time
        )?;
        writeln!(
            out,
            "Std dev of fixation time: {:.4} generations",
            self.std_dev_fixation_time
        )?;
        Ok(())
    }
}
