use crate::model::Trajectory;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (800, 600);

/// Render all trajectories of a batch as one PNG line chart.
///
/// One series per trial on a fixed 0..generations x 0.0..1.0 plane, with
/// series hues spaced evenly around the color wheel by trial index.
pub fn render<P: AsRef<Path>>(
    trajectories: &[Trajectory],
    generations: usize,
    file: P,
) -> Result<()> {
    let file = file.as_ref();
    let root = BitMapBackend::new(file, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).context("failed to fill background")?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0..generations as u32, 0.0..1.0)
        .context("failed to build chart plane")?;

    let n_series = trajectories.len().max(1);
    for (trial_idx, trajectory) in trajectories.iter().enumerate() {
        let color = series_color(trial_idx, n_series);
        let points = trajectory
            .samples()
            .iter()
            .map(|sample| (sample.generation as u32, sample.frequency));
        chart
            .draw_series(LineSeries::new(points, &color))
            .with_context(|| format!("failed to draw trial {trial_idx}"))?;
    }

    root.present()
        .with_context(|| format!("failed to write {file:?}"))?;

    Ok(())
}

fn series_color(trial_idx: usize, n_series: usize) -> HSLColor {
    HSLColor(trial_idx as f64 / n_series as f64, 1.0, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn hues_are_spaced_evenly() {
        let colors: Vec<_> = (0..4).map(|idx| series_color(idx, 4)).collect();

        for (idx, color) in colors.iter().enumerate() {
            assert_eq!(color.0, idx as f64 / 4.0);
        }
    }

    #[test]
    fn renders_a_png_file() {
        let mut trajectory = Trajectory::with_capacity(3);
        trajectory.push(0, 0.5);
        trajectory.push(1, 0.6);
        trajectory.push(2, 1.0);

        let file = env::temp_dir().join("gendrift-chart-test.png");
        fs::remove_file(&file).ok();

        render(&[trajectory], 10, &file).expect("chart should render");

        let metadata = fs::metadata(&file).expect("chart file should exist");
        assert!(metadata.len() > 0);

        fs::remove_file(&file).ok();
    }
}
