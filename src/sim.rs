//! Synthetic gradient waveforms
//!
//! Trapezoidal pulses with optional seeded measurement noise, used by the
//! demo and the tests to drive the correction loop with realistic shapes.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::EddyError;

/// Trapezoid shape in samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    /// Zero samples before the ramp up
    pub lead: usize,
    /// Samples spent ramping up (and down)
    pub ramp: usize,
    /// Samples held at `amplitude`
    pub plateau: usize,
    /// Total waveform length; trailing samples are zero
    pub len: usize,
    pub amplitude: f32,
}

impl Default for Trapezoid {
    fn default() -> Self {
        Self {
            lead: 16,
            ramp: 8,
            plateau: 64,
            len: 256,
            amplitude: 10.0,
        }
    }
}

impl Trapezoid {
    pub fn samples(&self) -> Vec<f32> {
        let ramp = self.ramp.max(1) as f32;
        let up_end = self.lead + self.ramp;
        let flat_end = up_end + self.plateau;
        let down_end = flat_end + self.ramp;

        (0..self.len)
            .map(|t| {
                if t < self.lead {
                    0.0
                } else if t < up_end {
                    self.amplitude * (t - self.lead + 1) as f32 / ramp
                } else if t < flat_end {
                    self.amplitude
                } else if t < down_end {
                    self.amplitude * (down_end - t - 1) as f32 / ramp
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Add zero-mean Gaussian noise with standard deviation `sigma`.
pub fn with_noise(waveform: &[f32], sigma: f32, seed: u64) -> Result<Vec<f32>, EddyError> {
    if !(sigma >= 0.0 && sigma.is_finite()) {
        return Err(EddyError::InvalidInput(format!(
            "noise sigma must be finite and non-negative, got {sigma}"
        )));
    }
    let noise = Normal::new(0.0_f32, sigma)
        .map_err(|err| EddyError::InvalidInput(format!("noise sigma {sigma}: {err}")))?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    Ok(waveform
        .iter()
        .map(|&v| v + noise.sample(&mut rng))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapezoid_shape() {
        let wave = Trapezoid {
            lead: 2,
            ramp: 2,
            plateau: 3,
            len: 12,
            amplitude: 4.0,
        }
        .samples();

        assert_eq!(
            wave,
            vec![0.0, 0.0, 2.0, 4.0, 4.0, 4.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn default_trapezoid_starts_at_zero() {
        let wave = Trapezoid::default().samples();
        assert_eq!(wave.len(), 256);
        assert_eq!(wave[0], 0.0);
        assert_eq!(wave.iter().copied().fold(0.0_f32, f32::max), 10.0);
    }

    #[test]
    fn noise_is_reproducible_per_seed() {
        let wave = Trapezoid::default().samples();
        let a = with_noise(&wave, 0.05, 7).unwrap();
        let b = with_noise(&wave, 0.05, 7).unwrap();
        let c = with_noise(&wave, 0.05, 8).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn invalid_sigma_is_rejected() {
        for sigma in [-1.0, f32::NAN, f32::INFINITY] {
            let err = with_noise(&[0.0], sigma, 1).unwrap_err();
            assert!(matches!(err, EddyError::InvalidInput(_)), "sigma {sigma}");
        }
    }

    #[test]
    fn zero_sigma_leaves_waveform_unchanged() {
        let wave = vec![0.0, 1.5, -2.0];
        assert_eq!(with_noise(&wave, 0.0, 3).unwrap(), wave);
    }
}
