//! Decay parameters
//!
//! One (amplitude, rate constant) pair per simulated eddy-current channel.

use std::path::Path;

use crate::EddyError;

/// Upper bound on a rate constant for which a channel decays instead of
/// oscillating with growing magnitude.
pub const MAX_STABLE_RATE: f32 = 2.0;

/// A single exponential decay channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayChannel {
    /// Weight of the channel's contribution to the distortion
    pub amplitude: f32,
    /// Fraction of the channel state lost per sample
    pub rate: f32,
}

impl DecayChannel {
    pub fn new(amplitude: f32, rate: f32) -> Self {
        Self { amplitude, rate }
    }
}

/// Ordered set of decay channels, immutable once loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecayParams {
    channels: Vec<DecayChannel>,
}

impl DecayParams {
    pub fn new(channels: Vec<DecayChannel>) -> Self {
        Self { channels }
    }

    /// Build from a flat `amplitude, rate, amplitude, rate, ...` sequence.
    ///
    /// `source` only labels the error when the count is odd.
    pub fn from_values(values: &[f32], source: &Path) -> Result<Self, EddyError> {
        if values.len() % 2 != 0 {
            return Err(EddyError::Format {
                path: source.to_path_buf(),
                reason: format!(
                    "expected sets of amplitude and rate constant values, got {} values",
                    values.len()
                ),
            });
        }

        let channels = values
            .chunks_exact(2)
            .map(|pair| DecayChannel::new(pair[0], pair[1]))
            .collect();

        Ok(Self { channels })
    }

    pub fn channels(&self) -> &[DecayChannel] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn amplitudes(&self) -> Vec<f32> {
        self.channels.iter().map(|c| c.amplitude).collect()
    }

    pub fn rates(&self) -> Vec<f32> {
        self.channels.iter().map(|c| c.rate).collect()
    }

    /// True when every rate lies in `[0, MAX_STABLE_RATE]`.
    pub fn is_stable(&self) -> bool {
        self.channels
            .iter()
            .all(|c| (0.0..=MAX_STABLE_RATE).contains(&c.rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_split_in_order() {
        let params =
            DecayParams::from_values(&[0.1, 0.5, 0.02, 0.01], Path::new("p.txt")).unwrap();
        assert_eq!(params.channel_count(), 2);
        assert_eq!(params.amplitudes(), vec![0.1, 0.02]);
        assert_eq!(params.rates(), vec![0.5, 0.01]);
    }

    #[test]
    fn odd_count_is_rejected_with_path() {
        let err = DecayParams::from_values(&[0.1, 0.5, 0.2], Path::new("bad.txt")).unwrap_err();
        match err {
            EddyError::Format { path, reason } => {
                assert_eq!(path, Path::new("bad.txt"));
                assert!(reason.contains("3 values"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_set_is_valid() {
        let params = DecayParams::from_values(&[], Path::new("empty.txt")).unwrap();
        assert!(params.is_empty());
        assert!(params.is_stable());
    }

    #[test]
    fn stability_flags_out_of_range_rates() {
        let stable = DecayParams::new(vec![DecayChannel::new(1.0, 0.5)]);
        let unstable = DecayParams::new(vec![
            DecayChannel::new(1.0, 0.5),
            DecayChannel::new(0.1, 2.5),
        ]);
        assert!(stable.is_stable());
        assert!(!unstable.is_stable());
    }
}
