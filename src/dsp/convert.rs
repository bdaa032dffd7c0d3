//! Type-erased conversion of raw sample blocks into complex doubles.
//!
//! A [`SampleFormat`] is matched once at activation to pick a monomorphised
//! conversion function; steady-state conversion never branches on the format.

use super::ConfigurationError;
use bytemuck::Pod;
use rustfft::num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Signed,
    Unsigned,
    Float,
}

/// Element format of an incoming sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleFormat {
    pub kind: NumericKind,
    /// Width of one scalar component in bits.
    pub bits: u8,
    pub complex: bool,
}

impl SampleFormat {
    pub const fn real(kind: NumericKind, bits: u8) -> Self {
        Self {
            kind,
            bits,
            complex: false,
        }
    }

    pub const fn complex(kind: NumericKind, bits: u8) -> Self {
        Self {
            kind,
            bits,
            complex: true,
        }
    }

    /// Bytes occupied by one element (both components for complex formats).
    pub fn element_size(&self) -> usize {
        let scalar = (self.bits as usize).div_ceil(8);
        if self.complex { scalar * 2 } else { scalar }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.complex { "complex_" } else { "" };
        let kind = match self.kind {
            NumericKind::Signed => "int",
            NumericKind::Unsigned => "uint",
            NumericKind::Float => "float",
        };
        write!(f, "{prefix}{kind}{}", self.bits)
    }
}

impl FromStr for SampleFormat {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigurationError::UnknownFormat(name.to_owned());
        let trimmed = name.trim();
        if trimmed == "char" {
            return Ok(Self::real(NumericKind::Signed, 8));
        }

        let (complex, scalar) = match trimmed.strip_prefix("complex_") {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (kind, bits) = if let Some(bits) = scalar.strip_prefix("uint") {
            (NumericKind::Unsigned, bits)
        } else if let Some(bits) = scalar.strip_prefix("int") {
            (NumericKind::Signed, bits)
        } else if let Some(bits) = scalar.strip_prefix("float") {
            (NumericKind::Float, bits)
        } else {
            return Err(unknown());
        };
        let bits = bits.parse::<u8>().map_err(|_| unknown())?;

        Ok(if complex {
            Self::complex(kind, bits)
        } else {
            Self::real(kind, bits)
        })
    }
}

trait Element: Pod {
    fn to_f64(self) -> f64;
}

macro_rules! element {
    ($($t:ty),* $(,)?) => {
        $(impl Element for $t {
            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

type ConvertFn = fn(&[u8], usize) -> Vec<Complex64>;

fn convert_real<T: Element>(raw: &[u8], count: usize) -> Vec<Complex64> {
    raw.chunks_exact(size_of::<T>())
        .take(count)
        .map(|chunk| Complex64::new(bytemuck::pod_read_unaligned::<T>(chunk).to_f64(), 0.0))
        .collect()
}

fn convert_complex<T: Element>(raw: &[u8], count: usize) -> Vec<Complex64> {
    raw.chunks_exact(2 * size_of::<T>())
        .take(count)
        .map(|chunk| {
            let [re, im] = bytemuck::pod_read_unaligned::<[T; 2]>(chunk);
            Complex64::new(re.to_f64(), im.to_f64())
        })
        .collect()
}

macro_rules! dispatch {
    ($format:expr; $(($kind:ident, $bits:literal) => $t:ty),* $(,)?) => {
        match ($format.kind, $format.bits, $format.complex) {
            $(
                (NumericKind::$kind, $bits, false) => Some(convert_real::<$t> as ConvertFn),
                (NumericKind::$kind, $bits, true) => Some(convert_complex::<$t> as ConvertFn),
            )*
            _ => None,
        }
    };
}

/// Conversion function bound to one sample format.
#[derive(Clone, Copy)]
pub struct SampleConverter {
    format: SampleFormat,
    convert: ConvertFn,
}

impl fmt::Debug for SampleConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleConverter")
            .field("format", &self.format)
            .finish()
    }
}

impl SampleConverter {
    pub fn bind(format: SampleFormat) -> Result<Self, ConfigurationError> {
        let convert = dispatch!(format;
            (Signed, 8) => i8,
            (Signed, 16) => i16,
            (Signed, 32) => i32,
            (Signed, 64) => i64,
            (Unsigned, 8) => u8,
            (Unsigned, 16) => u16,
            (Unsigned, 32) => u32,
            (Unsigned, 64) => u64,
            (Float, 32) => f32,
            (Float, 64) => f64,
        )
        .ok_or_else(|| ConfigurationError::UnsupportedFormat {
            format: format.to_string(),
        })?;

        Ok(Self { format, convert })
    }

    /// Converts the first `min(available, count)` elements of `raw`.
    pub fn convert(&self, raw: &[u8], count: usize) -> Vec<Complex64> {
        (self.convert)(raw, count)
    }
}
