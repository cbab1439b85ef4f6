//! Waveform visualisation
//!
//! Plots are observational only. `SvgPlot` writes one chart per iteration,
//! `RecordingPlot` keeps the series in memory and `NullPlot` drops them.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::correction::WaveformPlot;
use crate::EddyError;

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlot;

impl WaveformPlot for NullPlot {
    fn plot(&mut self, _: u32, _: &[f32], _: &[f32]) -> Result<(), EddyError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotFrame {
    pub iteration: u32,
    pub candidate: Vec<f32>,
    pub predicted: Vec<f32>,
}

/// Keeps a copy of every plotted iteration.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlot {
    pub frames: Vec<PlotFrame>,
}

impl WaveformPlot for RecordingPlot {
    fn plot(
        &mut self,
        iteration: u32,
        candidate: &[f32],
        predicted: &[f32],
    ) -> Result<(), EddyError> {
        self.frames.push(PlotFrame {
            iteration,
            candidate: candidate.to_vec(),
            predicted: predicted.to_vec(),
        });
        Ok(())
    }
}

/// Writes `iteration_NNN.svg` into a directory, candidate in blue and
/// prediction in red.
#[derive(Debug, Clone)]
pub struct SvgPlot {
    dir: PathBuf,
    size: (u32, u32),
}

impl SvgPlot {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, EddyError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| EddyError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            size: (1024, 256),
        })
    }

    pub fn path_for(&self, iteration: u32) -> PathBuf {
        self.dir.join(format!("iteration_{iteration:03}.svg"))
    }

    fn render(
        &self,
        path: &Path,
        iteration: u32,
        candidate: &[f32],
        predicted: &[f32],
    ) -> Result<(), EddyError> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let (lo, hi) = value_range(candidate.iter().chain(predicted));
        let max_t = candidate.len().max(2) as f64 - 1.0;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Iteration {iteration}"), ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..max_t, lo..hi)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Sample")
            .y_desc("Gradient")
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(LineSeries::new(
                candidate.iter().enumerate().map(|(t, &v)| (t as f64, f64::from(v))),
                &BLUE,
            ))
            .map_err(plot_err)?;

        chart
            .draw_series(LineSeries::new(
                predicted.iter().enumerate().map(|(t, &v)| (t as f64, f64::from(v))),
                &RED,
            ))
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
        Ok(())
    }
}

impl WaveformPlot for SvgPlot {
    fn plot(
        &mut self,
        iteration: u32,
        candidate: &[f32],
        predicted: &[f32],
    ) -> Result<(), EddyError> {
        let path = self.path_for(iteration);
        self.render(&path, iteration, candidate, predicted)
    }
}

fn plot_err(error: impl std::fmt::Display) -> EddyError {
    EddyError::Plot(error.to_string())
}

/// Padded vertical range covering every finite value.
fn value_range<'a>(values: impl Iterator<Item = &'a f32>) -> (f64, f64) {
    let (lo, hi) = values
        .map(|&v| f64::from(v))
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }

    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}
