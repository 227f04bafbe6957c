use crate::config::Config;
use crate::engine::DriftEngine;
use crate::model::{Trajectory, TrialOutcome};
use crate::stats::BatchStatistics;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;

/// Everything a completed batch produces.
///
/// Owned by the batch until handed, read-only, to the chart and the
/// persistence sinks.
pub struct BatchResult {
    pub trajectories: Vec<Trajectory>,
    pub outcomes: Vec<TrialOutcome>,
    pub stats: BatchStatistics,
}

/// Runs a configured number of independent trials and aggregates them.
pub struct BatchRunner {
    cfg: Config,
    seed: u64,
}

impl BatchRunner {
    /// Create a new `BatchRunner`, resolving the master seed.
    ///
    /// Uses the configured seed when present, otherwise draws one from OS
    /// entropy. The resolved seed is logged so any batch can be reproduced.
    pub fn new(cfg: Config) -> Result<Self> {
        let seed = match cfg.seed {
            Some(seed) => seed,
            None => ChaCha12Rng::try_from_os_rng()?.next_u64(),
        };
        log::info!("batch seed: {seed}");

        Ok(Self { cfg, seed })
    }

    /// Run all trials sequentially, then derive the batch statistics.
    pub fn run(&self) -> Result<BatchResult> {
        let n_trials = self.cfg.n_trials;
        let mut trajectories = Vec::with_capacity(n_trials);
        let mut outcomes = Vec::with_capacity(n_trials);

        for trial_idx in 0..n_trials {
            let engine = DriftEngine::new(&self.cfg, self.trial_rng(trial_idx));
            let (trajectory, outcome) = engine
                .run()
                .with_context(|| format!("failed to run trial {trial_idx}"))?;

            trajectories.push(trajectory);
            outcomes.push(outcome);

            let progress = 100.0 * (trial_idx + 1) as f64 / n_trials as f64;
            log::info!("completed {progress:06.2}%");
        }

        let stats = BatchStatistics::from_batch(&trajectories, &outcomes, n_trials);

        Ok(BatchResult {
            trajectories,
            outcomes,
            stats,
        })
    }

    // One ChaCha stream per trial keeps trials uncorrelated under a shared
    // master seed.
    fn trial_rng(&self, trial_idx: usize) -> ChaCha12Rng {
        let mut rng = ChaCha12Rng::seed_from_u64(self.seed);
        rng.set_stream(trial_idx as u64);
        rng
    }
}
