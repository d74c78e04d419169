//! MFCC feature extraction and per-frame scaling.
//!
//! The pipeline is the classic one: pre-emphasis, overlapping Hamming-windowed
//! frames, power spectrum via FFT, triangular mel filterbank, log compression,
//! DCT, sinusoidal liftering. All spectral math runs in f64 and the resulting
//! matrix is stored as f32, one row per frame.

use ndarray::Array2;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::PrepError;

/// Parameters of the MFCC transform.
///
/// The defaults are the usual values for 16 kHz speech; override individual
/// fields with struct-update syntax:
///
/// ```
/// use audioprep_rs::features::MfccParams;
///
/// let params = MfccParams {
///     num_ceps: 13,
///     ..MfccParams::default()
/// };
/// assert_eq!(params.nfilt, 40);
/// ```
#[derive(Debug, Clone)]
pub struct MfccParams {
    /// High-frequency amplification coefficient applied before framing.
    pub pre_emphasis: f32,
    /// Analysis window length in seconds.
    pub frame_size: f32,
    /// Step between adjacent windows in seconds (shorter than `frame_size`,
    /// so windows overlap).
    pub frame_stride: f32,
    /// FFT length.
    pub nfft: usize,
    /// Number of triangular mel filters.
    pub nfilt: usize,
    /// Cepstral coefficients retained after the DCT.
    pub num_ceps: usize,
    /// Sinusoidal liftering parameter.
    pub cep_lifter: usize,
}

impl Default for MfccParams {
    fn default() -> Self {
        Self {
            pre_emphasis: 0.97,
            frame_size: 0.025,
            frame_stride: 0.01,
            nfft: 512,
            nfilt: 40,
            num_ceps: 12,
            cep_lifter: 22,
        }
    }
}

/// Number of frames produced for a waveform of `len` samples.
///
/// The last frame is zero-padded, so for `len > frame_len` this is
/// `ceil((len - frame_len) / frame_step) + 1`; shorter signals still
/// produce one frame.
pub fn frame_count(len: usize, frame_len: usize, frame_step: usize) -> usize {
    if len <= frame_len {
        1
    } else {
        (len - frame_len).div_ceil(frame_step) + 1
    }
}

/// Compute MFCC features for one utterance.
///
/// Returns a matrix of shape (frame count, `params.num_ceps`).
///
/// # Errors
///
/// An empty waveform or a zero sample rate is malformed input and fails
/// with [`PrepError::EmptyWaveform`].
pub fn mfcc(samples: &[f32], sample_rate: u32, params: &MfccParams) -> Result<Array2<f32>, PrepError> {
    if samples.is_empty() || sample_rate == 0 {
        return Err(PrepError::EmptyWaveform);
    }

    let frame_len = (params.frame_size * sample_rate as f32).round() as usize;
    let frame_step = (params.frame_stride * sample_rate as f32).round() as usize;
    let n_freqs = params.nfft / 2 + 1;

    // 1. Pre-emphasis.
    let mut emphasized = Vec::with_capacity(samples.len());
    emphasized.push(samples[0] as f64);
    for t in 1..samples.len() {
        emphasized.push(samples[t] as f64 - params.pre_emphasis as f64 * samples[t - 1] as f64);
    }

    let n_frames = frame_count(emphasized.len(), frame_len, frame_step);
    log::trace!(
        "mfcc: {} samples at {} Hz -> {} frames of {} ({} step)",
        samples.len(),
        sample_rate,
        n_frames,
        frame_len,
        frame_step
    );

    let window = hamming_window(frame_len);
    let filter_bank = mel_filter_bank(params.nfilt, params.nfft, sample_rate);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(params.nfft);
    let mut fft_buf = vec![Complex::new(0.0, 0.0); params.nfft];

    let mut features = Array2::<f32>::zeros((n_frames, params.num_ceps));
    let mut log_energies = vec![0.0f64; params.nfilt];

    for frame_idx in 0..n_frames {
        let start = frame_idx * frame_step;

        // 2 + 3. Windowed frame (zero-padded past the signal end), power
        // spectrum of the NFFT-point transform.
        for i in 0..params.nfft {
            let sample = if i < frame_len {
                emphasized.get(start + i).copied().unwrap_or(0.0) * window[i]
            } else {
                0.0
            };
            fft_buf[i] = Complex::new(sample, 0.0);
        }
        fft.process(&mut fft_buf);

        // 4. Log mel filterbank energies, floored to avoid log(0) on
        // silent frames.
        for (m, filter) in filter_bank.iter().enumerate() {
            let mut energy = 0.0;
            for (k, &weight) in filter.iter().enumerate().take(n_freqs) {
                if weight > 0.0 {
                    energy += weight * fft_buf[k].norm_sqr() / params.nfft as f64;
                }
            }
            log_energies[m] = energy.max(f64::EPSILON).ln();
        }

        // 5 + 6. Orthonormal DCT-II, keep the first `num_ceps` coefficients,
        // then lifter.
        for k in 0..params.num_ceps {
            let mut acc = 0.0;
            for (n, &e) in log_energies.iter().enumerate() {
                acc += e
                    * (std::f64::consts::PI * k as f64 * (2 * n + 1) as f64
                        / (2 * params.nfilt) as f64)
                        .cos();
            }
            let scale = if k == 0 {
                (1.0 / params.nfilt as f64).sqrt()
            } else {
                (2.0 / params.nfilt as f64).sqrt()
            };
            features[[frame_idx, k]] = (acc * scale * lifter_weight(k, params.cep_lifter)) as f32;
        }
    }

    Ok(features)
}

/// Rescale each frame row of a feature matrix into [-1, 1] in place.
///
/// Min-max scaling is applied along the coefficient axis, each row
/// independently. A row whose values are all equal maps to all zeros, the
/// midpoint of the target range.
pub fn minmax_scale(features: &mut Array2<f32>) {
    for mut row in features.rows_mut() {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in row.iter() {
            min = min.min(v);
            max = max.max(v);
        }
        let span = max - min;
        for v in row.iter_mut() {
            *v = if span == 0.0 {
                0.0
            } else {
                -1.0 + 2.0 * (*v - min) / span
            };
        }
    }
}

fn hamming_window(size: usize) -> Vec<f64> {
    let factor = 2.0 * std::f64::consts::PI / (size - 1) as f64;
    (0..size)
        .map(|i| 0.54 - 0.46 * (i as f64 * factor).cos())
        .collect()
}

fn hz_to_mel(freq: f64) -> f64 {
    2595.0 * (1.0 + freq / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters with centers evenly spaced on the mel scale between
/// 0 Hz and the Nyquist frequency.
fn mel_filter_bank(nfilt: usize, nfft: usize, sample_rate: u32) -> Vec<Vec<f64>> {
    let n_freqs = nfft / 2 + 1;
    let mel_max = hz_to_mel(sample_rate as f64 / 2.0);

    let freq_points: Vec<f64> = (0..nfilt + 2)
        .map(|i| mel_to_hz(mel_max * i as f64 / (nfilt + 1) as f64))
        .collect();

    let mut bank = vec![vec![0.0; n_freqs]; nfilt];
    for (m, filter) in bank.iter_mut().enumerate() {
        let f_lower = freq_points[m];
        let f_center = freq_points[m + 1];
        let f_upper = freq_points[m + 2];

        for (k, weight) in filter.iter_mut().enumerate() {
            let freq = k as f64 * sample_rate as f64 / nfft as f64;
            if freq >= f_lower && freq <= f_center && f_center > f_lower {
                *weight = (freq - f_lower) / (f_center - f_lower);
            } else if freq > f_center && freq <= f_upper && f_upper > f_center {
                *weight = (f_upper - freq) / (f_upper - f_center);
            }
        }
    }

    bank
}

fn lifter_weight(k: usize, cep_lifter: usize) -> f64 {
    if cep_lifter == 0 {
        1.0
    } else {
        1.0 + cep_lifter as f64 / 2.0
            * (std::f64::consts::PI * k as f64 / cep_lifter as f64).sin()
    }
}
