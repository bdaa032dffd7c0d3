//! Windowed FFT power estimate with DC centred.

use crate::util::audio::{
    amplitude_to_db, apply_window, hann_window, power_to_db, swap_halves, window_power,
};
use rustfft::{Fft, FftPlanner, num_complex::Complex64};
use std::sync::Arc;

/// Window and plan cached for one transform length.
struct Plan {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    /// 20*log10(N) + 10*log10(mean(w^2)), subtracted from every bin.
    normalization_db: f64,
}

impl Plan {
    fn new(planner: &mut FftPlanner<f64>, len: usize) -> Self {
        let window = hann_window(len);
        let normalization_db = amplitude_to_db(len as f64) + power_to_db(window_power(&window));
        Self {
            fft: planner.plan_fft_forward(len),
            window,
            normalization_db,
        }
    }

    fn len(&self) -> usize {
        self.window.len()
    }
}

pub struct SpectralEstimator {
    planner: FftPlanner<f64>,
    plan: Plan,
    scratch: Vec<Complex64>,
}

impl std::fmt::Debug for SpectralEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralEstimator")
            .field("fft_size", &self.plan.len())
            .finish()
    }
}

impl SpectralEstimator {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let plan = Plan::new(&mut planner, fft_size);
        Self {
            planner,
            plan,
            scratch: Vec::new(),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.plan.len()
    }

    pub fn set_fft_size(&mut self, fft_size: usize) {
        if fft_size != self.plan.len() {
            self.plan = Plan::new(&mut self.planner, fft_size);
        }
    }

    /// Produces one dB power row with the same length as `samples`.
    ///
    /// Blocks shorter than the configured FFT size are transformed at their
    /// own length (lower resolution); the configured plan is left untouched.
    pub fn estimate(&mut self, mut samples: Vec<Complex64>) -> Vec<f64> {
        let len = samples.len();
        if len == 0 {
            return Vec::new();
        }

        let truncated;
        let plan = if len == self.plan.len() {
            &self.plan
        } else {
            truncated = Plan::new(&mut self.planner, len);
            &truncated
        };

        apply_window(&mut samples, &plan.window);
        self.scratch
            .resize(plan.fft.get_inplace_scratch_len(), Complex64::default());
        plan.fft
            .process_with_scratch(&mut samples, &mut self.scratch);

        let mut power: Vec<f64> = samples
            .iter()
            .map(|bin| power_to_db(bin.norm_sqr()) - plan.normalization_db)
            .collect();
        swap_halves(&mut power);
        power
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, cycles: f64, amplitude: f64) -> Vec<Complex64> {
        (0..len)
            .map(|n| {
                let phase = core::f64::consts::TAU * cycles * n as f64 / len as f64;
                Complex64::from_polar(amplitude, phase)
            })
            .collect()
    }

    fn argmax(values: &[f64]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap()
    }

    #[test]
    fn dc_block_peaks_at_centre_bin() {
        let mut estimator = SpectralEstimator::new(8);
        let row = estimator.estimate(vec![Complex64::new(1.0, 0.0); 8]);
        assert_eq!(row.len(), 8);
        assert_eq!(argmax(&row), 4);
        for (idx, value) in row.iter().enumerate().filter(|(idx, _)| *idx != 4) {
            assert!(*value < row[4] - 3.0, "bin {idx} = {value}");
        }
    }

    #[test]
    fn complex_tone_lands_at_shifted_bin() {
        let n = 64;
        let mut estimator = SpectralEstimator::new(n);
        for k in [1usize, 5, 20] {
            let row = estimator.estimate(tone(n, k as f64, 1.0));
            assert_eq!(argmax(&row), (n / 2 + k) % n);
        }

        let row = estimator.estimate(tone(n, -7.0, 1.0));
        assert_eq!(argmax(&row), n / 2 - 7);
    }

    #[test]
    fn fractional_tone_peaks_within_one_bin() {
        let n = 64;
        let mut estimator = SpectralEstimator::new(n);
        let row = estimator.estimate(tone(n, 5.4, 1.0));
        let peak = argmax(&row) as isize;
        assert!((peak - (n as isize / 2 + 5)).abs() <= 1);
    }

    #[test]
    fn real_sinusoid_shows_mirrored_peaks() {
        let n = 64;
        let k = 5;
        let samples: Vec<Complex64> = (0..n)
            .map(|i| {
                let phase = core::f64::consts::TAU * k as f64 * i as f64 / n as f64;
                Complex64::new(phase.cos(), 0.0)
            })
            .collect();
        let mut estimator = SpectralEstimator::new(n);
        let row = estimator.estimate(samples);
        let max = row[argmax(&row)];
        assert!((row[n / 2 + k] - max).abs() < 1e-9);
        assert!((row[n / 2 - k] - max).abs() < 1e-9);
    }

    #[test]
    fn full_scale_tone_level_is_stable_across_sizes() {
        let levels: Vec<f64> = [64usize, 256, 1024]
            .into_iter()
            .map(|n| {
                let mut estimator = SpectralEstimator::new(n);
                let row = estimator.estimate(tone(n, 8.0, 1.0));
                row[argmax(&row)]
            })
            .collect();
        for pair in levels.windows(2) {
            assert!((pair[0] - pair[1]).abs() < 0.5, "{levels:?}");
        }
    }

    #[test]
    fn estimate_is_deterministic() {
        let mut estimator = SpectralEstimator::new(128);
        let input = tone(128, 9.3, 0.7);
        let first = estimator.estimate(input.clone());
        let second = estimator.estimate(input);
        assert_eq!(
            first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn short_block_is_transformed_at_its_own_length() {
        let mut estimator = SpectralEstimator::new(64);
        let row = estimator.estimate(tone(16, 2.0, 1.0));
        assert_eq!(row.len(), 16);
        assert_eq!(argmax(&row), 10);
        assert_eq!(estimator.fft_size(), 64);
    }

    #[test]
    fn silence_yields_negative_infinity() {
        let mut estimator = SpectralEstimator::new(16);
        let row = estimator.estimate(vec![Complex64::default(); 16]);
        assert!(row.iter().all(|v| *v == f64::NEG_INFINITY));
    }
}
