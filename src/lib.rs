//! Eddy-current pre-compensation
//!
//! Predicts the gradient waveform a scanner actually produces when a
//! candidate waveform is distorted by a sum of exponentially decaying eddy
//! currents, and iteratively corrects the candidate until the prediction
//! matches the desired waveform.

pub mod config;
pub mod correction;
pub mod io;
pub mod logging;
pub mod model;
pub mod params;
pub mod plot;
pub mod sim;
pub mod uptake;

use std::path::PathBuf;

use thiserror::Error;

// Re-export main types
pub use config::RunConfig;
pub use correction::{
    run, CorrectionConfig, CorrectionOutcome, Corrector, IterationReport, WaveformPlot,
    WaveformSink,
};
pub use io::{load_params, load_waveform, write_waveform, FileSink};
pub use model::{predict, simulate, ResponseTrace};
pub use params::{DecayChannel, DecayParams};
pub use plot::{NullPlot, RecordingPlot, SvgPlot};

#[derive(Debug, Error)]
pub enum EddyError {
    #[error("{0}")]
    Config(String),
    #[error("{}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },
    #[error("unable to write file \"{}\"", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("plot error: {0}")]
    Plot(String),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
