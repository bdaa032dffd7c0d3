pub mod convert;
pub mod estimator;
pub mod scheduler;
pub mod spectrogram;
pub mod spectrum;

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Failures raised while binding or running a block's input format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("sample format {format} is not supported")]
    UnsupportedFormat { format: String },
    #[error("unknown sample format name {0:?}")]
    UnknownFormat(String),
    #[error("block is not activated; no sample converter is bound")]
    NotActivated,
}

/// One time-slice of dB power values, frequency-centred.
#[derive(Debug, Clone)]
pub struct PowerRow {
    pub timestamp: Instant,
    values: Arc<[f64]>,
}

impl PowerRow {
    pub fn new(timestamp: Instant, values: Vec<f64>) -> Self {
        Self {
            timestamp,
            values: values.into(),
        }
    }

    /// Placeholder row used to seed an empty raster.
    pub fn placeholder() -> Self {
        Self::new(Instant::now(), vec![0.0])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn peak_bin(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorUpdate<T> {
    None,
    Snapshot(T),
}

impl<T> From<ProcessorUpdate<T>> for Option<T> {
    fn from(update: ProcessorUpdate<T>) -> Self {
        match update {
            ProcessorUpdate::Snapshot(s) => Some(s),
            ProcessorUpdate::None => None,
        }
    }
}

/// A block driven once per arrival of raw samples on its inputs.
pub trait BlockProcessor {
    type Output;

    fn work(&mut self, now: Instant) -> Result<ProcessorUpdate<Self::Output>, ConfigurationError>;
}
