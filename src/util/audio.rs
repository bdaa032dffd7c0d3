use rustfft::num_complex::Complex64;

// decibel conversion constants/utils

// Display range (dB) handed to renderers. Rows themselves are never clamped.
pub const DB_FLOOR: f64 = -100.0;
pub const DB_CEILING: f64 = 0.0;

// Convert power (magnitude squared) to decibels. Zero power maps to -inf.
#[inline(always)]
pub fn power_to_db(power: f64) -> f64 {
    10.0 * power.log10()
}

// Convert an amplitude ratio to decibels.
#[inline(always)]
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.log10()
}

#[inline(always)]
pub fn clamp_db(db: f64, floor: f64, ceiling: f64) -> f64 {
    if db.is_nan() {
        return floor;
    }
    db.clamp(floor, ceiling)
}

// Symmetric Hann window: w(n) = 0.5 * (1 - cos(2*pi*n / (len - 1))).
pub fn hann_window(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|n| {
                    let phase = (n as f64) * core::f64::consts::TAU / denom;
                    0.5 * (1.0 - phase.cos())
                })
                .collect()
        }
    }
}

// Mean of the squared window coefficients.
pub fn window_power(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|w| w * w).sum::<f64>() / window.len() as f64
}

#[inline]
pub fn apply_window(buffer: &mut [Complex64], window: &[f64]) {
    debug_assert_eq!(buffer.len(), window.len());
    for (sample, coeff) in buffer.iter_mut().zip(window.iter()) {
        *sample *= *coeff;
    }
}

// Swap the two halves so DC lands at the centre.
pub fn swap_halves(values: &mut [f64]) {
    let half = values.len() / 2;
    let (front, back) = values.split_at_mut(half);
    front.swap_with_slice(&mut back[..half]);
}
