//! Frequency-domain plot block: one live power curve per input.

use super::convert::{SampleConverter, SampleFormat};
use super::estimator::SpectralEstimator;
use super::scheduler::{UpdateScheduler, rate_interval};
use super::spectrogram::{analyse_port, positive_finite};
use super::{BlockProcessor, ConfigurationError, PowerRow, ProcessorUpdate};
use crate::audio::input_port::InputPort;
use crate::audio::row_tap::{ROW_CHANNEL_CAPACITY, RowSender, row_channel};
use crate::ui::axis::AxisRanges;
use crate::ui::visualization::ViewCommand;
use crate::ui::visualization::spectrum::SpectrumView;
use async_channel::Sender;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreqDomainConfig {
    pub sample_rate: f64,
    pub fft_size: usize,
    /// Curve refreshes per second.
    pub display_rate: f64,
}

impl Default for FreqDomainConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1.0,
            fft_size: 1024,
            display_rate: 1.0,
        }
    }
}

/// One input's power row, tagged with the input it came from.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    pub input: usize,
    pub row: PowerRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumUpdate {
    /// Inputs that produced a curve this cycle.
    pub inputs: Vec<usize>,
    pub degraded: bool,
}

#[derive(Debug)]
pub struct FreqDomainBlock {
    config: FreqDomainConfig,
    title: String,
    inputs: Vec<InputPort>,
    converter: Option<SampleConverter>,
    estimator: SpectralEstimator,
    scheduler: UpdateScheduler,
    frames: RowSender<SpectrumFrame>,
    commands: Sender<ViewCommand>,
}

impl FreqDomainBlock {
    pub fn new(format: SampleFormat) -> (Self, SpectrumView) {
        Self::with_config(format, FreqDomainConfig::default())
    }

    pub fn with_config(format: SampleFormat, mut config: FreqDomainConfig) -> (Self, SpectrumView) {
        config.fft_size = config.fft_size.max(1);
        let (frames, frame_receiver) = row_channel(ROW_CHANNEL_CAPACITY);
        let (commands, command_receiver) = async_channel::unbounded();

        let mut input = InputPort::new(format);
        input.set_reserve(config.fft_size);

        let block = Self {
            config,
            title: String::new(),
            inputs: vec![input],
            converter: None,
            estimator: SpectralEstimator::new(config.fft_size),
            scheduler: UpdateScheduler::new(),
            frames,
            commands,
        };
        let view = SpectrumView::new(frame_receiver, command_receiver, block.axis_ranges());
        (block, view)
    }

    fn axis_ranges(&self) -> AxisRanges {
        AxisRanges::new(self.config.sample_rate, 1.0)
    }

    fn notify(&self, command: ViewCommand) {
        let _ = self.commands.try_send(command);
    }

    /// Adds inputs sharing input 0's format. Existing inputs are never removed.
    pub fn set_num_inputs(&mut self, count: usize) {
        let format = self.inputs[0].format();
        while self.inputs.len() < count {
            let mut port = InputPort::new(format);
            port.set_reserve(self.config.fft_size);
            self.inputs.push(port);
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn input(&self, index: usize) -> Option<&InputPort> {
        self.inputs.get(index)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.notify(ViewCommand::Title(self.title.clone()));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_display_rate(&mut self, display_rate: f64) {
        if positive_finite("display rate", display_rate) {
            self.config.display_rate = display_rate;
        }
    }

    pub fn display_rate(&self) -> f64 {
        self.config.display_rate
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
            warn!("[spectrum] ignoring FFT size 0");
            return;
        }
        self.config.fft_size = fft_size;
        self.estimator.set_fft_size(fft_size);
        for port in &mut self.inputs {
            port.set_reserve(fft_size);
        }
    }

    pub fn num_fft_bins(&self) -> usize {
        self.config.fft_size
    }

    pub fn enable_x_axis(&mut self, enabled: bool) {
        self.notify(ViewCommand::XAxis(enabled));
    }

    pub fn enable_y_axis(&mut self, enabled: bool) {
        self.notify(ViewCommand::YAxis(enabled));
    }

    pub fn activate(&mut self) -> Result<(), ConfigurationError> {
        self.set_num_fft_bins(self.config.fft_size);
        self.converter = Some(SampleConverter::bind(self.inputs[0].format())?);
        self.scheduler.reset();
        info!(
            "[spectrum] activated: format={}, inputs={}, fft_size={}",
            self.inputs[0].format(),
            self.inputs.len(),
            self.config.fft_size
        );
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if self.converter.take().is_some() {
            self.inputs.iter_mut().for_each(InputPort::clear);
            self.frames.close();
            self.commands.close();
            info!(
                "[spectrum] deactivated after {} update(s), {} curve(s) displaced",
                self.scheduler.accepted(),
                self.frames.dropped()
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.converter.is_some()
    }

    pub fn accept(&mut self, input: usize, bytes: &[u8]) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.inputs.get_mut(input) {
            Some(port) => {
                port.push(bytes);
                true
            }
            None => false,
        }
    }
}

impl BlockProcessor for FreqDomainBlock {
    type Output = SpectrumUpdate;

    fn work(&mut self, now: Instant) -> Result<ProcessorUpdate<Self::Output>, ConfigurationError> {
        let converter = self.converter.ok_or(ConfigurationError::NotActivated)?;

        if self.inputs.iter().all(|port| port.elements() == 0) {
            return Ok(ProcessorUpdate::None);
        }

        let due = self
            .scheduler
            .poll(now, rate_interval(self.config.display_rate));
        let mut update = SpectrumUpdate {
            inputs: Vec::new(),
            degraded: false,
        };

        for (index, port) in self.inputs.iter_mut().enumerate() {
            let available = port.elements();
            if due && available > 0 {
                let (row, degraded) = analyse_port(port, &converter, &mut self.estimator, now);
                update.degraded |= degraded;
                update.inputs.push(index);
                if !self.frames.send(SpectrumFrame { input: index, row }) {
                    debug!("[spectrum] display view dropped; curve discarded");
                }
            }
            port.consume(available);
        }

        Ok(if due {
            ProcessorUpdate::Snapshot(update)
        } else {
            ProcessorUpdate::None
        })
    }
}

impl Drop for FreqDomainBlock {
    fn drop(&mut self) {
        self.deactivate();
    }
}
