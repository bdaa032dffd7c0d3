//! Synthetic swept-tone source encoding raw blocks in any supported format.

use crate::dsp::ConfigurationError;
use crate::dsp::convert::{NumericKind, SampleFormat};
use bytemuck::Pod;

trait Encode: Pod {
    fn from_unit(value: f64) -> Self;
}

macro_rules! encode_int {
    ($($t:ty),*) => {
        $(impl Encode for $t {
            fn from_unit(value: f64) -> Self {
                let (min, max) = (<$t>::MIN as f64, <$t>::MAX as f64);
                let mid = (min + max) / 2.0;
                (mid + value * (max - mid) * 0.5).round() as $t
            }
        })*
    };
}

encode_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Encode for f32 {
    fn from_unit(value: f64) -> Self {
        value as f32
    }
}

impl Encode for f64 {
    fn from_unit(value: f64) -> Self {
        value
    }
}

type EncodeFn = fn(&[(f64, f64)], bool, &mut Vec<u8>);

fn encode<T: Encode>(samples: &[(f64, f64)], complex: bool, out: &mut Vec<u8>) {
    for &(re, im) in samples {
        out.extend_from_slice(bytemuck::bytes_of(&T::from_unit(re)));
        if complex {
            out.extend_from_slice(bytemuck::bytes_of(&T::from_unit(im)));
        }
    }
}

/// Tone whose normalised frequency sweeps back and forth across the band.
#[derive(Debug, Clone)]
pub struct ToneSource {
    format: SampleFormat,
    encode: EncodeFn,
    phase: f64,
    /// Cycles per sample.
    frequency: f64,
    sweep: f64,
}

impl ToneSource {
    pub fn new(format: SampleFormat, sweep: f64) -> Result<Self, ConfigurationError> {
        let encode: EncodeFn = match (format.kind, format.bits) {
            (NumericKind::Signed, 8) => encode::<i8>,
            (NumericKind::Signed, 16) => encode::<i16>,
            (NumericKind::Signed, 32) => encode::<i32>,
            (NumericKind::Signed, 64) => encode::<i64>,
            (NumericKind::Unsigned, 8) => encode::<u8>,
            (NumericKind::Unsigned, 16) => encode::<u16>,
            (NumericKind::Unsigned, 32) => encode::<u32>,
            (NumericKind::Unsigned, 64) => encode::<u64>,
            (NumericKind::Float, 32) => encode::<f32>,
            (NumericKind::Float, 64) => encode::<f64>,
            _ => {
                return Err(ConfigurationError::UnsupportedFormat {
                    format: format.to_string(),
                });
            }
        };

        Ok(Self {
            format,
            encode,
            phase: 0.0,
            frequency: -0.4,
            sweep,
        })
    }

    pub fn next_block(&mut self, elements: usize) -> Vec<u8> {
        let mut samples = Vec::with_capacity(elements);
        for _ in 0..elements {
            samples.push((self.phase.cos(), self.phase.sin()));
            self.phase = (self.phase + core::f64::consts::TAU * self.frequency)
                .rem_euclid(core::f64::consts::TAU);
        }

        self.frequency += self.sweep;
        if self.frequency.abs() > 0.4 {
            self.sweep = -self.sweep;
            self.frequency = self.frequency.clamp(-0.4, 0.4);
        }

        let mut out = Vec::with_capacity(elements * self.format.element_size());
        (self.encode)(&samples, self.format.complex, &mut out);
        out
    }

    /// Current tone frequency in cycles per sample.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}
