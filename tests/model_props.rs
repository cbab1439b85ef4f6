use eddy_precomp::correction::{self, CorrectionConfig};
use eddy_precomp::{predict, simulate, DecayChannel, DecayParams, NullPlot};
use proptest::prelude::*;

fn waveform() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-50.0_f32..50.0, 1..200)
}

fn channels() -> impl Strategy<Value = Vec<DecayChannel>> {
    prop::collection::vec(
        (0.0_f32..0.5, 0.0_f32..1.0).prop_map(|(a, k)| DecayChannel::new(a, k)),
        0..4,
    )
}

proptest! {
    #[test]
    fn prediction_keeps_length_and_zero_start(input in waveform(), chans in channels()) {
        let predicted = predict(&DecayParams::new(chans), &input).unwrap();
        prop_assert_eq!(predicted.len(), input.len());
        prop_assert_eq!(predicted[0], 0.0);
    }

    #[test]
    fn zero_amplitude_is_identity_after_first_sample(input in waveform(), rate in 0.0_f32..2.0) {
        let params = DecayParams::new(vec![DecayChannel::new(0.0, rate)]);
        let predicted = predict(&params, &input).unwrap();
        prop_assert_eq!(&predicted[1..], &input[1..]);
    }

    #[test]
    fn channel_state_count_matches_parameters(input in waveform(), chans in channels()) {
        let n = chans.len();
        let trace = simulate(&DecayParams::new(chans), &input).unwrap();
        prop_assert_eq!(trace.channel_states.len(), n);
        for state in &trace.channel_states {
            prop_assert_eq!(state.len(), input.len());
            prop_assert_eq!(state[0], 0.0);
        }
    }

    #[test]
    fn loop_emits_one_report_per_iteration(input in waveform(), iterations in 1_i64..=20) {
        let params = DecayParams::new(vec![DecayChannel::new(0.05, 0.3)]);
        let config = CorrectionConfig::new(iterations).unwrap();
        let outcome = correction::run(&params, &input, &config, &mut NullPlot, None).unwrap();

        prop_assert_eq!(outcome.reports.len() as i64, iterations);
        prop_assert_eq!(outcome.waveform.len(), input.len());
        for (idx, report) in outcome.reports.iter().enumerate() {
            prop_assert_eq!(report.iteration as usize, idx + 1);
        }
    }
}
