use crate::config::Config;
use crate::model::{Allele, Trajectory, TrialOutcome};
use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;

/// Single-trial Wright-Fisher drift engine.
///
/// Holds the trial parameters, the current allele frequency, and the random
/// number generator. Each generation is produced by binomial resampling of
/// the previous generation's frequency; the trial ends at the first exact
/// fixation or at the generation cap. The trial loop performs no I/O.
pub struct DriftEngine {
    population_size: usize,
    max_generations: usize,
    frequency: f64,
    rng: ChaCha12Rng,
}

impl DriftEngine {
    pub fn new(cfg: &Config, rng: ChaCha12Rng) -> Self {
        Self {
            population_size: cfg.population_size,
            max_generations: cfg.generations,
            frequency: cfg.initial_frequency,
            rng,
        }
    }

    /// Run one trial to fixation or to the generation cap.
    ///
    /// The trajectory always starts with the generation-0 sample. A
    /// degenerate initial frequency (exactly 0.0 or 1.0) is not
    /// short-circuited: the sampling loop reproduces it deterministically
    /// and fixation is detected at generation 1.
    pub fn run(mut self) -> Result<(Trajectory, TrialOutcome)> {
        let mut trajectory = Trajectory::with_capacity(self.max_generations);
        trajectory.push(0, self.frequency);

        for generation in 1..self.max_generations {
            self.advance_generation()?;
            trajectory.push(generation, self.frequency);

            if let Some(allele) = fixed_allele(self.frequency) {
                let outcome = TrialOutcome {
                    fixation_generation: generation,
                    fixed_allele: Some(allele),
                };
                return Ok((trajectory, outcome));
            }
        }

        let outcome = TrialOutcome {
            fixation_generation: self.max_generations,
            fixed_allele: None,
        };
        Ok((trajectory, outcome))
    }

    fn advance_generation(&mut self) -> Result<()> {
        // Each offspring allele is an independent draw from the parent
        // generation's frequency, so the count is Binomial(N, frequency).
        let rep_dist = Bernoulli::new(self.frequency)?;

        let mut dominant_count = 0;
        for _ in 0..self.population_size {
            if rep_dist.sample(&mut self.rng) {
                dominant_count += 1;
            }
        }

        self.frequency = dominant_count as f64 / self.population_size as f64;
        Ok(())
    }
}

fn fixed_allele(frequency: f64) -> Option<Allele> {
    if frequency == 0.0 {
        Some(Allele::Recessive)
    } else if frequency == 1.0 {
        Some(Allele::Dominant)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cfg(population_size: usize, initial_frequency: f64, generations: usize) -> Config {
        Config {
            population_size,
            initial_frequency,
            generations,
            n_trials: 1,
            seed: None,
            trial_log: false,
        }
    }

    fn run_seeded(cfg: &Config, seed: u64) -> (Trajectory, TrialOutcome) {
        let engine = DriftEngine::new(cfg, ChaCha12Rng::seed_from_u64(seed));
        engine.run().expect("trial should run")
    }

    #[test]
    fn trajectory_starts_at_generation_zero_with_consecutive_indices() {
        let cfg = test_cfg(100, 0.5, 50);
        let (trajectory, _) = run_seeded(&cfg, 7);

        let samples = trajectory.samples();
        assert_eq!(samples[0].generation, 0);
        assert_eq!(samples[0].frequency, 0.5);
        for pair in samples.windows(2) {
            assert_eq!(pair[1].generation, pair[0].generation + 1);
        }
    }

    #[test]
    fn frequencies_stay_in_unit_interval_and_on_the_population_grid() {
        let cfg = test_cfg(100, 0.5, 50);
        let (trajectory, _) = run_seeded(&cfg, 7);

        for sample in trajectory.samples() {
            assert!((0.0..=1.0).contains(&sample.frequency));
            // With N = 100, every frequency is an exact multiple of 1/100.
            let scaled = sample.frequency * 100.0;
            assert_eq!(scaled, scaled.round());
        }
    }

    #[test]
    fn capped_trial_records_every_generation() {
        // Fixation from 0.5 within 4 generations at N = 10000 is unreachable
        // in practice, so the trial must run into the cap.
        let cfg = test_cfg(10_000, 0.5, 5);
        let (trajectory, outcome) = run_seeded(&cfg, 11);

        assert_eq!(trajectory.samples().len(), 5);
        assert_eq!(outcome.fixation_generation, 5);
        assert_eq!(outcome.fixed_allele, None);
    }

    #[test]
    fn fixation_stops_the_trial() {
        // With a single individual the frequency is 0.0 or 1.0 after one
        // resampling, so every trial fixes at generation 1.
        let cfg = test_cfg(1, 0.5, 100);
        let (trajectory, outcome) = run_seeded(&cfg, 3);

        assert_eq!(outcome.fixation_generation, 1);
        assert_eq!(trajectory.samples().len(), 2);
        let last = trajectory.samples().last().expect("non-empty");
        assert_eq!(last.generation, 1);
        match outcome.fixed_allele {
            Some(Allele::Dominant) => assert_eq!(last.frequency, 1.0),
            Some(Allele::Recessive) => assert_eq!(last.frequency, 0.0),
            None => panic!("trial must fix"),
        }
    }

    #[test]
    fn fixation_generation_matches_last_sample() {
        let cfg = test_cfg(10, 0.5, 1000);
        let (trajectory, outcome) = run_seeded(&cfg, 19);

        // At N = 10 a fixation within 1000 generations is certain in practice.
        let allele = outcome.fixed_allele.expect("trial must fix");
        let last = trajectory.samples().last().expect("non-empty");
        assert_eq!(last.generation, outcome.fixation_generation);
        assert_eq!(trajectory.samples().len(), outcome.fixation_generation + 1);
        match allele {
            Allele::Dominant => assert_eq!(last.frequency, 1.0),
            Allele::Recessive => assert_eq!(last.frequency, 0.0),
        }
    }

    #[test]
    fn degenerate_high_frequency_fixes_dominant_at_generation_one() {
        let cfg = test_cfg(100, 1.0, 50);
        let (trajectory, outcome) = run_seeded(&cfg, 23);

        assert_eq!(outcome.fixation_generation, 1);
        assert_eq!(outcome.fixed_allele, Some(Allele::Dominant));
        assert_eq!(trajectory.samples().len(), 2);
        assert_eq!(trajectory.last_frequency(), Some(1.0));
    }

    #[test]
    fn degenerate_low_frequency_fixes_recessive_at_generation_one() {
        let cfg = test_cfg(100, 0.0, 50);
        let (trajectory, outcome) = run_seeded(&cfg, 23);

        assert_eq!(outcome.fixation_generation, 1);
        assert_eq!(outcome.fixed_allele, Some(Allele::Recessive));
        assert_eq!(trajectory.samples().len(), 2);
        assert_eq!(trajectory.last_frequency(), Some(0.0));
    }

    #[test]
    fn identical_seeds_reproduce_the_trajectory() {
        let cfg = test_cfg(100, 0.5, 50);
        let (trajectory_a, outcome_a) = run_seeded(&cfg, 42);
        let (trajectory_b, outcome_b) = run_seeded(&cfg, 42);

        assert_eq!(trajectory_a, trajectory_b);
        assert_eq!(outcome_a, outcome_b);
    }
}
