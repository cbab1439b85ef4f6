//! Multi-exponential eddy-current response model
//!
//! Each decay channel is a discrete leaky integrator driven by the
//! sample-to-sample change of the input waveform:
//!
//! ```text
//! s_n[t] = s_n[t-1] + (x[t] - x[t-1]) - k_n * s_n[t-1]
//! y[t]   = x[t] - sum_n a_n * s_n[t]
//! ```
//!
//! Channel states start at zero and are rebuilt from scratch on every call,
//! so `y[0]` is always zero.

use crate::params::DecayParams;
use crate::EddyError;

/// Full output of one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTrace {
    /// Predicted (distorted) waveform, same length as the input
    pub predicted: Vec<f32>,
    /// Internal state of each channel over time, one row per channel
    pub channel_states: Vec<Vec<f32>>,
}

/// Simulate every channel over the whole input waveform.
pub fn simulate(params: &DecayParams, input: &[f32]) -> Result<ResponseTrace, EddyError> {
    if input.is_empty() {
        return Err(EddyError::InvalidInput(
            "cannot predict the response to an empty waveform".to_string(),
        ));
    }

    let len = input.len();
    let channels = params.channels();
    let mut channel_states = vec![vec![0.0_f32; len]; channels.len()];
    let mut predicted = vec![0.0_f32; len];

    for t in 1..len {
        let d_input = input[t] - input[t - 1];
        let mut sum = 0.0_f32;

        for (channel, state) in channels.iter().zip(channel_states.iter_mut()) {
            let prev = state[t - 1];
            state[t] = prev + d_input - channel.rate * prev;
            sum += channel.amplitude * state[t];
        }

        predicted[t] = input[t] - sum;
    }

    Ok(ResponseTrace {
        predicted,
        channel_states,
    })
}

/// Predicted waveform produced when `input` is played out through the
/// eddy-current channels described by `params`.
pub fn predict(params: &DecayParams, input: &[f32]) -> Result<Vec<f32>, EddyError> {
    simulate(params, input).map(|trace| trace.predicted)
}
