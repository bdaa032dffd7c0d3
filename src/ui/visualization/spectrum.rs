use super::ViewCommand;
use crate::dsp::PowerRow;
use crate::dsp::spectrum::SpectrumFrame;
use crate::ui::axis::{AxisRanges, Interval};
use crate::ui::raster::scale_index;
use crate::util::audio::{DB_CEILING, DB_FLOOR};
use async_channel::Receiver;

/// Display-context half of the frequency-domain plot: latest curve per input.
#[derive(Debug)]
pub struct SpectrumView {
    curves: Vec<Option<PowerRow>>,
    axes: AxisRanges,
    title: String,
    x_axis: bool,
    y_axis: bool,
    frames: Receiver<SpectrumFrame>,
    commands: Receiver<ViewCommand>,
}

impl SpectrumView {
    pub(crate) fn new(
        frames: Receiver<SpectrumFrame>,
        commands: Receiver<ViewCommand>,
        axes: AxisRanges,
    ) -> Self {
        Self {
            curves: Vec::new(),
            axes,
            title: String::new(),
            x_axis: true,
            y_axis: true,
            frames,
            commands,
        }
    }

    /// Returns the number of curve updates applied.
    pub fn drain(&mut self) -> usize {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                ViewCommand::Axes(axes) => self.axes = axes,
                ViewCommand::Title(title) => self.title = title,
                ViewCommand::XAxis(enabled) => self.x_axis = enabled,
                ViewCommand::YAxis(enabled) => self.y_axis = enabled,
            }
        }

        let mut applied = 0;
        while let Ok(SpectrumFrame { input, row }) = self.frames.try_recv() {
            if self.curves.len() <= input {
                self.curves.resize(input + 1, None);
            }
            self.curves[input] = Some(row);
            applied += 1;
        }
        applied
    }

    pub fn is_closed(&self) -> bool {
        self.frames.is_closed() && self.frames.is_empty()
    }

    pub fn curve(&self, input: usize) -> Option<&PowerRow> {
        self.curves.get(input).and_then(Option::as_ref)
    }

    pub fn axes(&self) -> &AxisRanges {
        &self.axes
    }

    /// Fixed dB range of the vertical axis.
    pub fn y_interval(&self) -> Interval {
        Interval::new(DB_FLOOR, DB_CEILING)
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

    /// Curve value of `input` at frequency `x` in display units.
    pub fn sample(&self, input: usize, x: f64) -> Option<f64> {
        let curve = self.curve(input)?;
        let norm = self.axes.x_interval().normalize(x);
        curve.values().get(scale_index(norm, curve.len())).copied()
    }
}
