//! Contrast-uptake analysis
//!
//! Averages the signal inside a region of interest across a stack of frames,
//! then locates contrast arrival (first forward difference above a threshold)
//! and the signal slope from arrival to peak enhancement.

use crate::EddyError;

/// Rise in mean ROI signal between consecutive frames that marks arrival.
pub const ARRIVAL_THRESHOLD: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ContrastInfo {
    pub name: String,
    pub dose: f32,
}

/// Row-major single-channel image
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
}

impl Frame {
    pub fn new(width: usize, height: usize, pixels: Vec<f32>) -> Result<Self, EddyError> {
        if pixels.len() != width * height {
            return Err(EddyError::InvalidInput(format!(
                "frame of {width}x{height} needs {} pixels, got {}",
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

/// Region of interest, same shape as the frame it applies to
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: usize,
    height: usize,
    inside: Vec<bool>,
}

impl Mask {
    pub fn new(width: usize, height: usize, inside: Vec<bool>) -> Result<Self, EddyError> {
        if inside.len() != width * height {
            return Err(EddyError::InvalidInput(format!(
                "mask of {width}x{height} needs {} entries, got {}",
                width * height,
                inside.len()
            )));
        }
        Ok(Self {
            width,
            height,
            inside,
        })
    }

    /// Mask selecting every pixel at or above `level`.
    pub fn threshold(frame: &Frame, level: f32) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            inside: frame.pixels.iter().map(|&p| p >= level).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.inside.iter().filter(|&&m| m).count()
    }
}

/// Mean ROI signal for every frame; frames whose mask is empty read as zero.
pub fn roi_timecourse(frames: &[Frame], masks: &[Mask]) -> Result<Vec<f32>, EddyError> {
    let first = frames
        .first()
        .ok_or_else(|| EddyError::InvalidInput("no frames supplied".to_string()))?;

    if masks.len() != frames.len() {
        return Err(EddyError::InvalidInput(format!(
            "expected one mask per frame ({} frames, {} masks)",
            frames.len(),
            masks.len()
        )));
    }

    let mut signal = Vec::with_capacity(frames.len());
    for (idx, (frame, mask)) in frames.iter().zip(masks).enumerate() {
        if frame.width != first.width || frame.height != first.height {
            return Err(EddyError::InvalidInput(format!(
                "frame {idx} is {}x{}, expected {}x{}",
                frame.width, frame.height, first.width, first.height
            )));
        }
        if mask.width != frame.width || mask.height != frame.height {
            return Err(EddyError::InvalidInput(format!(
                "mask {idx} does not match its frame dimensions"
            )));
        }

        let (sum, count) = frame
            .pixels
            .iter()
            .zip(&mask.inside)
            .filter(|&(_, &inside)| inside)
            .fold((0.0_f32, 0_usize), |(sum, count), (&p, _)| (sum + p, count + 1));

        signal.push(if count > 0 { sum / count as f32 } else { 0.0 });
    }

    log::debug!("computed ROI timecourse over {} frames", frames.len());
    Ok(signal)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalGradient {
    /// `s[d+1] - s[d]`, padded with a trailing zero to the signal length
    pub timecourse: Vec<f32>,
    /// First frame whose forward difference exceeds the threshold, or 0
    pub threshold_frame: usize,
}

pub fn temporal_gradient(signal: &[f32], threshold: f32) -> TemporalGradient {
    let mut timecourse = vec![0.0_f32; signal.len()];
    let mut threshold_frame = None;

    for (d, pair) in signal.windows(2).enumerate() {
        timecourse[d] = pair[1] - pair[0];
        if threshold_frame.is_none() && timecourse[d] > threshold {
            threshold_frame = Some(d);
        }
    }

    TemporalGradient {
        timecourse,
        threshold_frame: threshold_frame.unwrap_or(0),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UptakeSummary {
    pub peak_frame: usize,
    pub peak_signal: f32,
    pub arrival_frame: usize,
    pub arrival_signal: f32,
    /// Signal change per frame between arrival and peak, negative when the
    /// peak comes first; `None` when peak and arrival are the same frame
    pub slope: Option<f32>,
    pub gradient: TemporalGradient,
}

pub fn analyse_uptake(signal: &[f32], threshold: f32) -> Result<UptakeSummary, EddyError> {
    if signal.is_empty() {
        return Err(EddyError::InvalidInput("empty ROI signal".to_string()));
    }

    // first occurrence of the maximum
    let (peak_frame, peak_signal) = signal
        .iter()
        .copied()
        .enumerate()
        .fold((0, signal[0]), |best, (idx, v)| if v > best.1 { (idx, v) } else { best });

    let gradient = temporal_gradient(signal, threshold);
    let arrival_frame = gradient.threshold_frame;
    let arrival_signal = signal[arrival_frame];

    let slope = (peak_frame != arrival_frame)
        .then(|| (peak_signal - arrival_signal) / (peak_frame as f32 - arrival_frame as f32));

    log::debug!("contrast arrival at frame {arrival_frame}, peak at frame {peak_frame}");

    Ok(UptakeSummary {
        peak_frame,
        peak_signal,
        arrival_frame,
        arrival_signal,
        slope,
        gradient,
    })
}
