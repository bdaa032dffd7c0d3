//! Human-scale units and coordinate ranges for the plot axes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    GHz,
}

impl FrequencyUnit {
    pub fn select(sample_rate: f64) -> Self {
        if sample_rate >= 2e9 {
            Self::GHz
        } else if sample_rate >= 2e6 {
            Self::MHz
        } else if sample_rate >= 2e3 {
            Self::KHz
        } else {
            Self::Hz
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            Self::Hz => 1.0,
            Self::KHz => 1e3,
            Self::MHz => 1e6,
            Self::GHz => 1e9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hz => "Hz",
            Self::KHz => "kHz",
            Self::MHz => "MHz",
            Self::GHz => "GHz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    pub fn select(time_span: f64) -> Self {
        if time_span <= 100e-9 {
            Self::Nanos
        } else if time_span <= 100e-6 {
            Self::Micros
        } else if time_span <= 100e-3 {
            Self::Millis
        } else {
            Self::Seconds
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Millis => 1e3,
            Self::Micros => 1e6,
            Self::Nanos => 1e9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Millis => "ms",
            Self::Micros => "us",
            Self::Nanos => "ns",
        }
    }
}

pub fn select_freq_unit(sample_rate: f64) -> (f64, FrequencyUnit) {
    let unit = FrequencyUnit::select(sample_rate);
    (sample_rate / unit.divisor(), unit)
}

pub fn select_time_unit(time_span: f64) -> (f64, TimeUnit) {
    let unit = TimeUnit::select(time_span);
    (time_span * unit.multiplier(), unit)
}

/// Closed value range along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range, clamped to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        let width = self.width();
        if !width.is_finite() || width <= 0.0 {
            return 0.0;
        }
        let norm = (value - self.min) / width;
        if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) }
    }
}

/// Sample-rate and time-span derived axis state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRanges {
    pub sample_rate: f64,
    pub scaled_rate: f64,
    pub freq_unit: FrequencyUnit,
    pub time_span: f64,
    pub scaled_span: f64,
    pub time_unit: TimeUnit,
}

impl Default for AxisRanges {
    fn default() -> Self {
        Self::new(1.0, 10.0)
    }
}

impl AxisRanges {
    pub fn new(sample_rate: f64, time_span: f64) -> Self {
        let (scaled_rate, freq_unit) = select_freq_unit(sample_rate);
        let (scaled_span, time_unit) = select_time_unit(time_span);
        Self {
            sample_rate,
            scaled_rate,
            freq_unit,
            time_span,
            scaled_span,
            time_unit,
        }
    }

    /// Frequency axis in display units, DC centred.
    pub fn x_interval(&self) -> Interval {
        Interval::new(-self.scaled_rate / 2.0, self.scaled_rate / 2.0)
    }

    /// Time axis in display units, 0 = newest.
    pub fn y_interval(&self) -> Interval {
        Interval::new(0.0, self.scaled_span)
    }

    /// Converts an x coordinate in display units back to Hz.
    pub fn frequency_at(&self, x: f64) -> f64 {
        if self.scaled_rate == 0.0 {
            return x;
        }
        x * self.sample_rate / self.scaled_rate
    }
}
