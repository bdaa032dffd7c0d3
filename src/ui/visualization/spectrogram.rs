//! Display-context half of the spectrogram: owns the raster and axis state.

use super::{SelectionEvents, ViewCommand};
use crate::dsp::PowerRow;
use crate::ui::axis::AxisRanges;
use crate::ui::raster::RasterGrid;
use crate::util::audio::{DB_CEILING, DB_FLOOR, clamp_db};
use async_channel::{Receiver, TryRecvError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_DISPLAY_ROWS: usize = 256;

#[derive(Debug)]
pub struct SpectrogramView {
    raster: RasterGrid,
    axes: AxisRanges,
    title: String,
    x_axis: bool,
    y_axis: bool,
    rows: Receiver<PowerRow>,
    commands: Receiver<ViewCommand>,
    display_rows: Arc<AtomicUsize>,
    selections: SelectionEvents,
    received: u64,
}

impl SpectrogramView {
    pub(crate) fn new(
        rows: Receiver<PowerRow>,
        commands: Receiver<ViewCommand>,
        display_rows: Arc<AtomicUsize>,
        axes: AxisRanges,
    ) -> Self {
        let capacity = display_rows.load(Ordering::Relaxed);
        Self {
            raster: RasterGrid::with_capacity(capacity),
            axes,
            title: String::new(),
            x_axis: true,
            y_axis: true,
            rows,
            commands,
            display_rows,
            selections: SelectionEvents::default(),
            received: 0,
        }
    }

    /// Sets the visible row count; the producer's scheduler follows it.
    pub fn resize(&mut self, rows: usize) {
        self.raster.set_capacity(rows);
        self.display_rows.store(rows, Ordering::Relaxed);
    }

    /// Applies queued commands and appends queued rows in arrival order.
    /// Returns the number of rows appended.
    pub fn drain(&mut self) -> usize {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }

        let mut appended = 0;
        loop {
            match self.rows.try_recv() {
                Ok(row) => {
                    self.raster.append(row);
                    appended += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        self.received += appended as u64;
        appended
    }

    /// Blocks until at least one row arrives, then drains.
    /// Returns `None` once the block has shut down and every row was consumed.
    pub fn wait(&mut self) -> Option<usize> {
        let row = self.rows.recv_blocking().ok()?;
        self.raster.append(row);
        self.received += 1;
        Some(1 + self.drain())
    }

    fn apply(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::Axes(axes) => self.axes = axes,
            ViewCommand::Title(title) => self.title = title,
            ViewCommand::XAxis(enabled) => self.x_axis = enabled,
            ViewCommand::YAxis(enabled) => self.y_axis = enabled,
        }
    }

    pub fn raster(&self) -> &RasterGrid {
        &self.raster
    }

    pub fn axes(&self) -> &AxisRanges {
        &self.axes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_axis_enabled(&self) -> bool {
        self.x_axis
    }

    pub fn y_axis_enabled(&self) -> bool {
        self.y_axis
    }

    pub fn rows_received(&self) -> u64 {
        self.received
    }

    /// Raw dB value at (frequency, age) in display units.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        self.raster.sample(x, y, &self.axes)
    }

    /// Value clamped to the colour-bar range, for renderers.
    pub fn sample_clamped(&self, x: f64, y: f64) -> Option<f64> {
        self.sample(x, y)
            .map(|db| clamp_db(db, DB_FLOOR, DB_CEILING))
    }

    /// Reports a pick at `x` (display units) and returns the frequency in Hz.
    pub fn select(&mut self, x: f64) -> f64 {
        let frequency = self.axes.frequency_at(x);
        self.selections.emit(frequency);
        frequency
    }

    pub fn subscribe(&mut self) -> Receiver<f64> {
        self.selections.subscribe()
    }
}
