use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use eddy_precomp::correction::{self, WaveformPlot, WaveformSink};
use eddy_precomp::io::{load_params, load_waveform, write_history_csv, FileSink};
use eddy_precomp::{logging, NullPlot, RunConfig, SvgPlot};

#[derive(Debug, Parser)]
#[command(name = "eddy")]
#[command(about = "Iterative eddy-current pre-compensation of a gradient waveform")]
struct Cli {
    /// Print loader and per-iteration diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Number of correction iterations (1 to 100, default 10)
    #[arg(short = 'n', allow_hyphen_values = true)]
    iterations: Option<i64>,

    /// TOML file providing defaults for the options below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the per-iteration deviation history as CSV
    #[arg(long)]
    history: Option<PathBuf>,

    /// Write one SVG plot per iteration into this directory
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Decay parameters: amplitude and rate constant pairs
    parameters: PathBuf,

    /// Desired gradient waveform
    waveform: PathBuf,

    /// Where to store the final input waveform
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(error) = try_main(cli) {
        eprintln!("ERROR: {error:#} - aborting");
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(v) = cli.iterations {
        cfg.iterations = v;
    }
    if cli.verbose {
        cfg.verbose = true;
    }
    if cli.history.is_some() {
        cfg.history = cli.history.clone();
    }
    if cli.plot_dir.is_some() {
        cfg.plot_dir = cli.plot_dir.clone();
    }

    logging::init(cfg.verbose);
    let correction_cfg = cfg.correction()?;

    let params = load_params(&cli.parameters)?;
    let desired = load_waveform(&cli.waveform)?;

    let mut plot: Box<dyn WaveformPlot> = match &cfg.plot_dir {
        Some(dir) => Box::new(SvgPlot::new(dir)?),
        None => Box::new(NullPlot),
    };
    let mut sink = cli.output.as_ref().map(|path| FileSink::new(path.clone()));

    let outcome = correction::run(
        &params,
        &desired,
        &correction_cfg,
        plot.as_mut(),
        sink.as_mut().map(|s| s as &mut dyn WaveformSink),
    )?;

    if let Some(path) = &cfg.history {
        write_history_csv(path, &outcome.reports)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
    }

    if let Some(sink) = &sink {
        log::debug!("final waveform stored in \"{}\"", sink.path().display());
    }

    Ok(())
}
