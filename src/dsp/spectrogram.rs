//! Scrolling spectrogram block: rate-limited FFT rows handed to a display view.

use super::convert::{SampleConverter, SampleFormat};
use super::estimator::SpectralEstimator;
use super::scheduler::{UpdateScheduler, raster_interval};
use super::{BlockProcessor, ConfigurationError, PowerRow, ProcessorUpdate};
use crate::audio::input_port::InputPort;
use crate::audio::row_tap::{ROW_CHANNEL_CAPACITY, RowSender, row_channel};
use crate::ui::axis::AxisRanges;
use crate::ui::visualization::ViewCommand;
use crate::ui::visualization::spectrogram::{DEFAULT_DISPLAY_ROWS, SpectrogramView};
use async_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrogramConfig {
    /// Hz.
    pub sample_rate: f64,
    /// Bins per row and elements consumed per estimate.
    pub fft_size: usize,
    /// Seconds represented by the full raster depth.
    pub time_span: f64,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1.0,
            fft_size: 1024,
            time_span: 10.0,
        }
    }
}

/// Summary of one accepted cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramUpdate {
    pub bins: usize,
    /// Fewer than `fft_size` elements were available; the window was truncated.
    pub degraded: bool,
    pub peak_bin: Option<usize>,
}

pub(crate) fn positive_finite(what: &str, value: f64) -> bool {
    if value.is_finite() && value > 0.0 {
        true
    } else {
        warn!("[spectrogram] ignoring {what} {value}; must be positive and finite");
        false
    }
}

/// Converts and transforms up to `fft_size` queued elements of `port`.
pub(crate) fn analyse_port(
    port: &InputPort,
    converter: &SampleConverter,
    estimator: &mut SpectralEstimator,
    now: Instant,
) -> (PowerRow, bool) {
    let fft_size = estimator.fft_size();
    let count = port.elements().min(fft_size);
    let degraded = count < fft_size;
    if degraded {
        debug!("[spectrogram] degraded row: {count} of {fft_size} elements available");
    }
    let samples = converter.convert(port.bytes(), count);
    (PowerRow::new(now, estimator.estimate(samples)), degraded)
}

#[derive(Debug)]
pub struct SpectrogramBlock {
    config: SpectrogramConfig,
    title: String,
    input: InputPort,
    converter: Option<SampleConverter>,
    estimator: SpectralEstimator,
    scheduler: UpdateScheduler,
    display_rows: Arc<AtomicUsize>,
    rows: RowSender<PowerRow>,
    commands: Sender<ViewCommand>,
}

impl SpectrogramBlock {
    pub fn new(format: SampleFormat) -> (Self, SpectrogramView) {
        Self::with_config(format, SpectrogramConfig::default())
    }

    pub fn with_config(
        format: SampleFormat,
        mut config: SpectrogramConfig,
    ) -> (Self, SpectrogramView) {
        config.fft_size = config.fft_size.max(1);
        let (rows, row_receiver) = row_channel(ROW_CHANNEL_CAPACITY);
        let (commands, command_receiver) = async_channel::unbounded();
        let display_rows = Arc::new(AtomicUsize::new(DEFAULT_DISPLAY_ROWS));

        let mut input = InputPort::new(format);
        input.set_reserve(config.fft_size);

        let block = Self {
            config,
            title: String::new(),
            input,
            converter: None,
            estimator: SpectralEstimator::new(config.fft_size),
            scheduler: UpdateScheduler::new(),
            display_rows: display_rows.clone(),
            rows,
            commands,
        };
        let view = SpectrogramView::new(
            row_receiver,
            command_receiver,
            display_rows,
            block.axis_ranges(),
        );
        (block, view)
    }

    fn axis_ranges(&self) -> AxisRanges {
        AxisRanges::new(self.config.sample_rate, self.config.time_span)
    }

    fn notify(&self, command: ViewCommand) {
        let _ = self.commands.try_send(command);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.notify(ViewCommand::Title(self.title.clone()));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        if positive_finite("sample rate", sample_rate) {
            self.config.sample_rate = sample_rate;
            self.notify(ViewCommand::Axes(self.axis_ranges()));
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    pub fn set_num_fft_bins(&mut self, fft_size: usize) {
        if fft_size == 0 {
            warn!("[spectrogram] ignoring FFT size 0");
            return;
        }
        self.config.fft_size = fft_size;
        self.estimator.set_fft_size(fft_size);
        self.input.set_reserve(fft_size);
    }

    pub fn num_fft_bins(&self) -> usize {
        self.config.fft_size
    }

    pub fn set_time_span(&mut self, time_span: f64) {
        if positive_finite("time span", time_span) {
            self.config.time_span = time_span;
            self.notify(ViewCommand::Axes(self.axis_ranges()));
        }
    }

    pub fn time_span(&self) -> f64 {
        self.config.time_span
    }

    pub fn enable_x_axis(&mut self, enabled: bool) {
        self.notify(ViewCommand::XAxis(enabled));
    }

    pub fn enable_y_axis(&mut self, enabled: bool) {
        self.notify(ViewCommand::YAxis(enabled));
    }

    pub fn input(&self) -> &InputPort {
        &self.input
    }

    /// Binds the converter for the input format and re-applies the reserve.
    pub fn activate(&mut self) -> Result<(), ConfigurationError> {
        self.set_num_fft_bins(self.config.fft_size);
        let converter = SampleConverter::bind(self.input.format())?;
        self.converter = Some(converter);
        self.scheduler.reset();
        info!(
            "[spectrogram] activated: format={}, fft_size={}, time_span={}s",
            self.input.format(),
            self.config.fft_size,
            self.config.time_span
        );
        Ok(())
    }

    /// Stops accepting samples and closes the row channel.
    pub fn deactivate(&mut self) {
        if self.converter.take().is_some() {
            self.input.clear();
            self.rows.close();
            self.commands.close();
            info!(
                "[spectrogram] deactivated after {} update(s), {} skipped arrival(s), {} row(s) displaced",
                self.scheduler.accepted(),
                self.scheduler.skipped(),
                self.rows.dropped()
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.converter.is_some()
    }

    /// Queues raw bytes from upstream. Dropped when the block is not active.
    pub fn accept(&mut self, bytes: &[u8]) -> bool {
        if !self.is_active() {
            return false;
        }
        self.input.push(bytes);
        true
    }
}

impl BlockProcessor for SpectrogramBlock {
    type Output = SpectrogramUpdate;

    fn work(&mut self, now: Instant) -> Result<ProcessorUpdate<Self::Output>, ConfigurationError> {
        let converter = self.converter.ok_or(ConfigurationError::NotActivated)?;

        let available = self.input.elements();
        if available == 0 {
            return Ok(ProcessorUpdate::None);
        }

        let rows = self.display_rows.load(Ordering::Relaxed);
        let interval = raster_interval(rows, self.config.time_span);
        let update = if self.scheduler.poll(now, interval) {
            let (row, degraded) = analyse_port(&self.input, &converter, &mut self.estimator, now);
            let update = SpectrogramUpdate {
                bins: row.len(),
                degraded,
                peak_bin: row.peak_bin(),
            };
            if !self.rows.send(row) {
                debug!("[spectrogram] display view dropped; row discarded");
            }
            ProcessorUpdate::Snapshot(update)
        } else {
            ProcessorUpdate::None
        };

        self.input.consume(available);
        Ok(update)
    }
}

impl Drop for SpectrogramBlock {
    fn drop(&mut self) {
        self.deactivate();
    }
}
