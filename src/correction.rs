//! Iterative pre-compensation loop
//!
//! Starting from the desired waveform, each iteration predicts the distorted
//! output, measures its deviation from the desired waveform and adds the
//! error back onto the candidate input (proportional feedback, unit gain).

use serde::Serialize;

use crate::model::predict;
use crate::params::DecayParams;
use crate::EddyError;

pub const DEFAULT_ITERATIONS: u32 = 10;
pub const MAX_ITERATIONS: u32 = 100;

/// Receives the final candidate waveform of a run.
pub trait WaveformSink {
    fn persist(&mut self, waveform: &[f32]) -> Result<(), EddyError>;
}

/// Receives the candidate and predicted waveforms of every iteration.
///
/// Purely observational: a failing plot is logged and the loop carries on.
pub trait WaveformPlot {
    fn plot(&mut self, iteration: u32, candidate: &[f32], predicted: &[f32])
        -> Result<(), EddyError>;
}

/// Loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionConfig {
    /// Number of predict/correct iterations, in `1..=MAX_ITERATIONS`
    pub iterations: u32,
}

impl CorrectionConfig {
    /// Validated constructor; accepts a signed count so that negative
    /// requests get a meaningful message instead of a parse failure.
    pub fn new(iterations: i64) -> Result<Self, EddyError> {
        if iterations < 1 {
            return Err(EddyError::Config(format!(
                "number of iterations entered is invalid ({iterations})"
            )));
        }
        if iterations > i64::from(MAX_ITERATIONS) {
            return Err(EddyError::Config(format!(
                "number of iterations entered ({iterations}) exceeds limit of {MAX_ITERATIONS}"
            )));
        }

        Ok(Self {
            iterations: iterations as u32,
        })
    }

    pub fn validate(&self) -> Result<(), EddyError> {
        Self::new(i64::from(self.iterations)).map(|_| ())
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Deviation statistics for one iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationReport {
    pub iteration: u32,
    pub max_deviation: f32,
    pub rms_deviation: f32,
}

/// Result of evaluating the current candidate
#[derive(Debug, Clone)]
pub struct IterationStep {
    pub report: IterationReport,
    pub predicted: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    /// Candidate that produced the final iteration's prediction. This is the
    /// waveform handed to the sink.
    pub waveform: Vec<f32>,
    /// Candidate after the final iteration's correction was applied
    pub next_candidate: Vec<f32>,
    /// One report per iteration, in order
    pub reports: Vec<IterationReport>,
}

impl CorrectionOutcome {
    pub fn final_report(&self) -> Option<&IterationReport> {
        self.reports.last()
    }
}

pub fn max_abs_deviation(desired: &[f32], predicted: &[f32]) -> f32 {
    desired
        .iter()
        .zip(predicted)
        .map(|(d, p)| (d - p).abs())
        .fold(0.0_f32, f32::max)
}

pub fn rms_deviation(desired: &[f32], predicted: &[f32]) -> f32 {
    if desired.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = desired
        .iter()
        .zip(predicted)
        .map(|(d, p)| (d - p) * (d - p))
        .sum();
    (sum_sq / desired.len() as f32).sqrt()
}

/// Owns the candidate waveform for the lifetime of a run.
pub struct Corrector<'a> {
    params: &'a DecayParams,
    desired: &'a [f32],
    candidate: Vec<f32>,
    iteration: u32,
}

impl<'a> Corrector<'a> {
    pub fn new(params: &'a DecayParams, desired: &'a [f32]) -> Result<Self, EddyError> {
        if desired.is_empty() {
            return Err(EddyError::InvalidInput(
                "desired waveform contains no samples".to_string(),
            ));
        }

        Ok(Self {
            params,
            desired,
            candidate: desired.to_vec(),
            iteration: 0,
        })
    }

    /// Predict the output for the current candidate and measure how far it
    /// is from the desired waveform. Does not touch the candidate.
    pub fn evaluate(&mut self) -> Result<IterationStep, EddyError> {
        let predicted = predict(self.params, &self.candidate)?;
        self.iteration += 1;

        let report = IterationReport {
            iteration: self.iteration,
            max_deviation: max_abs_deviation(self.desired, &predicted),
            rms_deviation: rms_deviation(self.desired, &predicted),
        };

        Ok(IterationStep { report, predicted })
    }

    /// Add the prediction error onto the candidate.
    pub fn apply(&mut self, predicted: &[f32]) {
        for ((c, d), p) in self.candidate.iter_mut().zip(self.desired).zip(predicted) {
            *c += d - p;
        }
    }

    /// One full predict/compare/correct cycle.
    pub fn step(&mut self) -> Result<IterationStep, EddyError> {
        let step = self.evaluate()?;
        self.apply(&step.predicted);
        Ok(step)
    }

    pub fn candidate(&self) -> &[f32] {
        &self.candidate
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn into_candidate(self) -> Vec<f32> {
        self.candidate
    }
}

/// Run the full correction loop.
///
/// On the last iteration the sink receives the candidate *before* that
/// iteration's correction is applied, so the persisted waveform is the one
/// whose deviation was reported last.
pub fn run(
    params: &DecayParams,
    desired: &[f32],
    config: &CorrectionConfig,
    plot: &mut dyn WaveformPlot,
    mut sink: Option<&mut dyn WaveformSink>,
) -> Result<CorrectionOutcome, EddyError> {
    config.validate()?;
    let mut corrector = Corrector::new(params, desired)?;

    if !params.is_stable() {
        log::warn!("decay rate constants outside [0, 2]; the predicted response may diverge");
    }
    log::debug!(
        "correcting {} samples against {} decay channels over {} iterations",
        desired.len(),
        params.channel_count(),
        config.iterations
    );

    let mut reports = Vec::with_capacity(config.iterations as usize);
    let mut waveform = Vec::new();

    for it in 1..=config.iterations {
        let step = corrector.evaluate()?;
        log::info!(
            "iteration number: {}, maximum absolute deviation: {}",
            it,
            step.report.max_deviation
        );
        log::debug!("iteration {it}: rms deviation {}", step.report.rms_deviation);

        if let Err(err) = plot.plot(it, corrector.candidate(), &step.predicted) {
            log::warn!("iteration {it}: plot failed: {err}");
        }

        if it == config.iterations {
            if let Some(sink) = sink.as_mut() {
                sink.persist(corrector.candidate())?;
            }
            waveform = corrector.candidate().to_vec();
        }

        corrector.apply(&step.predicted);
        reports.push(step.report);
    }

    Ok(CorrectionOutcome {
        waveform,
        next_candidate: corrector.into_candidate(),
        reports,
    })
}
