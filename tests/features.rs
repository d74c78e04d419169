use ndarray::array;

use audioprep_rs::features::{frame_count, mfcc, minmax_scale, MfccParams};
use audioprep_rs::PrepError;

fn sine_wave(seconds: f32, freq: f32, sample_rate: u32) -> Vec<f32> {
    let len = (seconds * sample_rate as f32) as usize;
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn frame_count_matches_closed_form() {
    // ceil((L - frame_len) / frame_step) + 1, last frame zero-padded.
    assert_eq!(frame_count(16_000, 400, 160), 99);
    assert_eq!(frame_count(400, 400, 160), 1);
    assert_eq!(frame_count(401, 400, 160), 2);
    assert_eq!(frame_count(560, 400, 160), 2);
    assert_eq!(frame_count(561, 400, 160), 3);
    // Shorter than one frame still yields a single padded frame.
    assert_eq!(frame_count(10, 400, 160), 1);
}

#[test]
fn mfcc_shape_for_one_second_at_16k() {
    let samples = sine_wave(1.0, 440.0, 16_000);
    let params = MfccParams::default();

    let features = mfcc(&samples, 16_000, &params).expect("mfcc should succeed");

    assert_eq!(features.ncols(), 12);
    assert_eq!(
        features.nrows(),
        frame_count(samples.len(), 400, 160),
        "one row per analysis frame"
    );
    assert!(features.iter().all(|v| v.is_finite()));
}

#[test]
fn mfcc_respects_parameter_overrides() {
    let samples = sine_wave(0.5, 220.0, 16_000);
    let params = MfccParams {
        num_ceps: 13,
        nfilt: 26,
        ..MfccParams::default()
    };

    let features = mfcc(&samples, 16_000, &params).unwrap();
    assert_eq!(features.ncols(), 13);
}

#[test]
fn mfcc_is_deterministic() {
    let samples = sine_wave(0.3, 330.0, 16_000);
    let params = MfccParams::default();

    let first = mfcc(&samples, 16_000, &params).unwrap();
    let second = mfcc(&samples, 16_000, &params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mfcc_rejects_empty_waveform() {
    let err = mfcc(&[], 16_000, &MfccParams::default()).unwrap_err();
    assert!(matches!(err, PrepError::EmptyWaveform));

    let err = mfcc(&[0.1, 0.2], 0, &MfccParams::default()).unwrap_err();
    assert!(matches!(err, PrepError::EmptyWaveform));
}

#[test]
fn minmax_scale_maps_row_extremes_exactly() {
    let mut matrix = array![[1.0f32, 3.0, 5.0], [-2.0, 0.0, 6.0]];
    minmax_scale(&mut matrix);

    for row in matrix.rows() {
        let min = row.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min + 1.0).abs() < 1e-6, "row minimum maps to -1");
        assert!((max - 1.0).abs() < 1e-6, "row maximum maps to +1");
    }
    // Midpoint of the first row lands at the midpoint of the range.
    assert!((matrix[[0, 1]] - 0.0).abs() < 1e-6);
}

#[test]
fn minmax_scale_degenerate_row_is_all_zeros() {
    let mut matrix = array![[4.0f32, 4.0, 4.0], [0.0, 1.0, 2.0]];
    minmax_scale(&mut matrix);

    assert!(matrix.row(0).iter().all(|&v| v == 0.0));
    assert!(matrix.iter().all(|v| v.is_finite()), "never NaN on equal rows");
}

#[test]
fn scaled_mfcc_stays_in_range() {
    let samples = sine_wave(1.0, 440.0, 16_000);
    let mut features = mfcc(&samples, 16_000, &MfccParams::default()).unwrap();
    minmax_scale(&mut features);

    assert!(features.iter().all(|&v| (-1.0..=1.0).contains(&v)));
}
