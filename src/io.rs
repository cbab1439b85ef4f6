use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::correction::{IterationReport, WaveformSink};
use crate::params::DecayParams;
use crate::uptake::ContrastInfo;
use crate::EddyError;

fn read_text(path: &Path) -> Result<String, EddyError> {
    fs::read_to_string(path).map_err(|err| EddyError::Format {
        path: path.to_path_buf(),
        reason: format!("unable to open file ({err})"),
    })
}

/// Parse every whitespace-separated token of a file as an `f32`.
pub fn read_values(path: &Path) -> Result<Vec<f32>, EddyError> {
    let raw = read_text(path)?;

    raw.split_whitespace()
        .map(|token| {
            token.parse::<f32>().map_err(|_| EddyError::Format {
                path: path.to_path_buf(),
                reason: format!("invalid numeric value \"{token}\""),
            })
        })
        .collect()
}

pub fn load_params(path: &Path) -> Result<DecayParams, EddyError> {
    log::debug!("loading parameters file \"{}\"...", path.display());
    let values = read_values(path)?;
    let params = DecayParams::from_values(&values, path)?;
    log::debug!(
        "parameters file \"{}\" loaded OK ({} decay channels)",
        path.display(),
        params.channel_count()
    );
    Ok(params)
}

pub fn load_waveform(path: &Path) -> Result<Vec<f32>, EddyError> {
    log::debug!("loading waveform file \"{}\"...", path.display());
    let waveform = read_values(path)?;
    log::debug!(
        "waveform file \"{}\" loaded OK ({} samples)",
        path.display(),
        waveform.len()
    );
    Ok(waveform)
}

/// Agent name followed by its dose.
pub fn load_contrast_info(path: &Path) -> Result<ContrastInfo, EddyError> {
    log::debug!("loading contrast info file \"{}\"...", path.display());
    let raw = read_text(path)?;
    let mut tokens = raw.split_whitespace();

    let format_err = |reason: String| EddyError::Format {
        path: path.to_path_buf(),
        reason,
    };

    let name = tokens
        .next()
        .ok_or_else(|| format_err("missing contrast agent name".to_string()))?;
    let dose_token = tokens
        .next()
        .ok_or_else(|| format_err("missing contrast agent dose".to_string()))?;
    let dose = dose_token
        .parse::<f32>()
        .map_err(|_| format_err(format!("invalid dose \"{dose_token}\"")))?;

    Ok(ContrastInfo {
        name: name.to_string(),
        dose,
    })
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> EddyError + '_ {
    move |source| EddyError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One value per line, shortest representation that reads back exactly.
pub fn write_waveform(path: &Path, waveform: &[f32]) -> Result<(), EddyError> {
    let file = File::create(path).map_err(io_err(path))?;
    let mut out = BufWriter::new(file);

    for value in waveform {
        writeln!(out, "{value}").map_err(io_err(path))?;
    }

    out.flush().map_err(io_err(path))?;
    Ok(())
}

pub fn write_history_csv(path: &Path, reports: &[IterationReport]) -> Result<(), EddyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let mut writer = Writer::from_path(path)?;
    for report in reports {
        writer.serialize(report)?;
    }

    writer.flush().map_err(io_err(path))?;
    Ok(())
}

/// Writes the final candidate waveform to a text file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WaveformSink for FileSink {
    fn persist(&mut self, waveform: &[f32]) -> Result<(), EddyError> {
        log::debug!("writing final waveform to \"{}\"", self.path.display());
        write_waveform(&self.path, waveform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_span_lines_and_mixed_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("values.txt");
        fs::write(&path, "0.5  1e-2\n\t-3\n4.25\n").unwrap();

        assert_eq!(read_values(&path).unwrap(), vec![0.5, 0.01, -3.0, 4.25]);
    }

    #[test]
    fn missing_file_is_a_format_error_naming_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let err = read_values(&path).unwrap_err();
        assert!(matches!(err, EddyError::Format { .. }));
        assert!(err.to_string().contains("absent.txt"));
    }

    #[test]
    fn bad_token_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "1.0 two 3.0").unwrap();

        let err = read_values(&path).unwrap_err();
        assert!(err.to_string().contains("\"two\""));
    }

    #[test]
    fn empty_waveform_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "\n").unwrap();

        assert!(load_waveform(&path).unwrap().is_empty());
    }

    #[test]
    fn odd_parameter_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.txt");
        fs::write(&path, "0.1 0.5\n0.2\n").unwrap();

        let err = load_params(&path).unwrap_err();
        assert!(matches!(err, EddyError::Format { .. }));
    }

    #[test]
    fn unwritable_output_is_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");

        let err = write_waveform(&path, &[1.0]).unwrap_err();
        assert!(matches!(err, EddyError::Io { .. }));
        assert!(err.to_string().contains("out.txt"));
    }

    #[test]
    fn history_has_header_and_one_row_per_iteration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let reports = [
            IterationReport {
                iteration: 1,
                max_deviation: 10.0,
                rms_deviation: 5.5,
            },
            IterationReport {
                iteration: 2,
                max_deviation: 0.25,
                rms_deviation: 0.125,
            },
        ];

        write_history_csv(&path, &reports).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "iteration,max_deviation,rms_deviation");
        assert_eq!(lines[1], "1,10.0,5.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn contrast_info_reads_name_and_dose() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contrast.txt");
        fs::write(&path, "Gadovist 0.1\n").unwrap();

        let info = load_contrast_info(&path).unwrap();
        assert_eq!(info.name, "Gadovist");
        assert_eq!(info.dose, 0.1);
    }
}
