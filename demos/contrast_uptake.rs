//! Contrast-uptake demo
//!
//! Builds a synthetic dynamic series in which a bright lesion enhances after
//! contrast injection, then reports arrival, peak and uptake slope inside the
//! lesion ROI. Pass a contrast info file (`<agent> <dose>`) to label the run.

use std::path::PathBuf;

use eddy_precomp::io::load_contrast_info;
use eddy_precomp::logging;
use eddy_precomp::uptake::{
    analyse_uptake, roi_timecourse, ContrastInfo, Frame, Mask, ARRIVAL_THRESHOLD,
};

const SIZE: usize = 32;
const FRAMES: usize = 20;
const INJECTION: usize = 5;

/// Lesion signal over time: flat baseline, linear wash-in, slow wash-out.
fn lesion_signal(frame: usize) -> f32 {
    let baseline = 100.0;
    if frame <= INJECTION {
        baseline
    } else if frame <= INJECTION + 6 {
        baseline + 40.0 * (frame - INJECTION) as f32
    } else {
        baseline + 240.0 - 8.0 * (frame - INJECTION - 6) as f32
    }
}

fn build_frame(frame: usize) -> anyhow::Result<Frame> {
    let centre = SIZE as f32 / 2.0;
    let pixels = (0..SIZE * SIZE)
        .map(|idx| {
            let (x, y) = ((idx % SIZE) as f32, (idx / SIZE) as f32);
            let r = ((x - centre).powi(2) + (y - centre).powi(2)).sqrt();
            if r < 6.0 {
                lesion_signal(frame)
            } else {
                60.0
            }
        })
        .collect();
    Ok(Frame::new(SIZE, SIZE, pixels)?)
}

fn main() -> anyhow::Result<()> {
    logging::init(false);

    let contrast = match std::env::args().nth(1) {
        Some(path) => load_contrast_info(&PathBuf::from(path))?,
        None => ContrastInfo {
            name: "gadobutrol".to_string(),
            dose: 0.1,
        },
    };

    let frames = (0..FRAMES)
        .map(build_frame)
        .collect::<anyhow::Result<Vec<_>>>()?;
    // lesion ROI taken from the baseline frame
    let roi = Mask::threshold(&frames[0], 80.0);
    let masks = vec![roi.clone(); frames.len()];

    let signal = roi_timecourse(&frames, &masks)?;
    let summary = analyse_uptake(&signal, ARRIVAL_THRESHOLD)?;

    println!("Contrast agent: {} ({} mmol/kg)", contrast.name, contrast.dose);
    println!("ROI pixels: {}", roi.count());
    println!();
    println!("{:>5} {:>10} {:>10}", "frame", "signal", "gradient");
    for (idx, (s, g)) in signal.iter().zip(&summary.gradient.timecourse).enumerate() {
        println!("{idx:>5} {s:>10.2} {g:>10.2}");
    }
    println!();
    println!(
        "Arrival at frame {} (signal {:.2})",
        summary.arrival_frame, summary.arrival_signal
    );
    println!(
        "Peak at frame {} (signal {:.2})",
        summary.peak_frame, summary.peak_signal
    );
    match summary.slope {
        Some(slope) => println!("Uptake slope: {slope:.3} per frame"),
        None => println!("Uptake slope: undefined (peak at arrival)"),
    }

    Ok(())
}
