use crate::batch::{BatchResult, BatchRunner};
use crate::chart;
use crate::config::Config;
use crate::model::Trajectory;
use anyhow::{Context, Result};
use glob::glob;
use rmp_serde::{decode, encode};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Run one batch in the next numbered run directory.
    ///
    /// Prints the summary to stdout, then feeds the artifact sinks. Sink
    /// failures after a completed batch are logged, never fatal.
    pub fn run_batch(&self) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let runner = BatchRunner::new(self.cfg.clone()).context("failed to construct runner")?;
        let result = runner.run().context("failed to run batch")?;

        result
            .stats
            .write_summary(&mut io::stdout().lock())
            .context("failed to write summary")?;

        if let Err(error) = self.save_results(run_idx, &result) {
            log::warn!("failed to save results: {error:#}");
        }

        let chart_file = self.chart_file(run_idx);
        match chart::render(&result.trajectories, self.cfg.generations, &chart_file) {
            Ok(()) => log::info!("saved {chart_file:?}"),
            Err(error) => log::warn!("failed to render chart: {error:#}"),
        }

        if self.cfg.trial_log {
            if let Err(error) = self.save_trial_log(run_idx, &result.trajectories) {
                log::warn!("failed to write trial log: {error:#}");
            }
        }

        Ok(())
    }

    /// Re-render the chart of a stored run from its persisted trajectories.
    pub fn render_chart(&self, run_idx: usize) -> Result<()> {
        let trajectories = self
            .load_trajectories(run_idx)
            .context("failed to load trajectories")?;

        let chart_file = self.chart_file(run_idx);
        chart::render(&trajectories, self.cfg.generations, &chart_file)
            .context("failed to render chart")?;
        log::info!("saved {chart_file:?}");

        Ok(())
    }

    /// Remove all run directories from the simulation directory.
    pub fn clean_sim(&self) -> Result<()> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for entry in glob(pattern).context("failed to glob run dirs")? {
            let path = entry.context("failed to read glob entry")?;
            if path.is_dir() {
                fs::remove_dir_all(&path).with_context(|| format!("failed to remove {path:?}"))?;
                log::info!("removed {path:?}");
            }
        }
        Ok(())
    }

    fn save_results(&self, run_idx: usize, result: &BatchResult) -> Result<()> {
        write_msgpack(self.trajectories_file(run_idx), &result.trajectories)?;
        write_msgpack(self.outcomes_file(run_idx), &result.outcomes)?;
        write_msgpack(self.results_file(run_idx), &result.stats)?;
        Ok(())
    }

    fn load_trajectories(&self, run_idx: usize) -> Result<Vec<Trajectory>> {
        let file = self.trajectories_file(run_idx);
        let file = File::open(&file).with_context(|| format!("failed to open {file:?}"))?;
        let reader = BufReader::new(file);
        decode::from_read(reader).context("failed to deserialize trajectories")
    }

    // Tab-separated per-generation log of the first trial, written from the
    // trajectory data after the batch completes.
    fn save_trial_log(&self, run_idx: usize, trajectories: &[Trajectory]) -> Result<()> {
        let Some(trajectory) = trajectories.first() else {
            return Ok(());
        };

        let file = self.trial_log_file(run_idx);
        let file = File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "generation\tdominant_frequency\trecessive_frequency")?;
        for sample in trajectory.samples() {
            writeln!(
                writer,
                "{}\t{:.4}\t{:.4}",
                sample.generation,
                sample.frequency,
                1.0 - sample.frequency
            )?;
        }
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    fn count_run_dirs(&self) -> Result<usize> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|path| path.is_dir())
            .count();
        Ok(count)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn trajectories_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("trajectories.msgpack")
    }

    fn outcomes_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("outcomes.msgpack")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }

    fn chart_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("chart.png")
    }

    fn trial_log_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("trial-log.tsv")
    }
}

fn write_msgpack<P: AsRef<Path>, T: Serialize>(file: P, value: &T) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, value).context("failed to serialize value")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
