mod audio;
mod dsp;
mod settings;
mod ui;
mod util;

use anyhow::{Context, Result, anyhow};
use audio::input_port::InputPort;
use audio::tone::ToneSource;
use dsp::convert::SampleFormat;
use dsp::spectrogram::SpectrogramBlock;
use dsp::spectrum::FreqDomainBlock;
use dsp::{BlockProcessor, ConfigurationError, ProcessorUpdate};
use settings::{PlotKind, Settings};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use ui::visualization::spectrogram::SpectrogramView;
use ui::visualization::spectrum::SpectrumView;

// Spacing between synthetic block arrivals.
const ARRIVAL_INTERVAL: Duration = Duration::from_millis(5);
const SWEEP_PER_BLOCK: f64 = 0.002;
const REPORT_EVERY: u64 = 25;

fn main() {
    util::telemetry::init();

    if let Err(err) = run() {
        error!("[main] {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_path);
    let settings = Settings::load_or_default(&path);
    if !path.exists()
        && let Err(err) = settings.save(&path)
    {
        warn!("[main] could not write default settings to {path:?}: {err:#}");
    }
    let format = settings.sample_format()?;

    info!(
        "[main] {:?} plot, format={format}, fft_size={}, sample_rate={}",
        settings.plot, settings.fft_size, settings.sample_rate
    );

    match settings.plot {
        PlotKind::Spectrogram => run_spectrogram(&settings, format),
        PlotKind::FreqDomain => run_freq_domain(&settings, format),
    }
}

fn run_deadline(settings: &Settings) -> Instant {
    let seconds = if settings.run_seconds.is_finite() {
        settings.run_seconds.max(0.0)
    } else {
        0.0
    };
    Instant::now() + Duration::from_secs_f64(seconds)
}

fn join_source(handle: thread::JoinHandle<Result<(), ConfigurationError>>) -> Result<()> {
    handle
        .join()
        .map_err(|_| anyhow!("source thread panicked"))?
        .context("source thread stopped")
}

fn run_spectrogram(settings: &Settings, format: SampleFormat) -> Result<()> {
    let (mut block, mut view) = SpectrogramBlock::new(format);
    settings.apply_to_spectrogram(&mut block);
    view.resize(settings.display_rows);
    block.activate()?;
    info!(
        "[main] spectrogram '{}': {} Hz, {} bins, {}s over {} rows, reserve {}",
        block.title(),
        block.sample_rate(),
        block.num_fft_bins(),
        block.time_span(),
        view.raster().len(),
        block.input().reserve()
    );

    let source = ToneSource::new(format, SWEEP_PER_BLOCK)?;
    let deadline = run_deadline(settings);
    let handle = thread::Builder::new()
        .name("spectroscope-source".into())
        .spawn(move || feed_spectrogram(block, source, deadline))
        .context("failed to spawn source thread")?;

    display_spectrogram(&mut view);
    join_source(handle)
}

fn feed_spectrogram(
    mut block: SpectrogramBlock,
    mut source: ToneSource,
    deadline: Instant,
) -> Result<(), ConfigurationError> {
    let elements = block.num_fft_bins();
    while Instant::now() < deadline {
        block.accept(&source.next_block(elements));
        if block.input().is_ready()
            && let ProcessorUpdate::Snapshot(update) = block.work(Instant::now())?
        {
            debug!(
                "[source] row: bins={}, peak={:?}, degraded={}, tone at {:.3} cycles/sample",
                update.bins,
                update.peak_bin,
                update.degraded,
                source.frequency()
            );
        }
        thread::sleep(ARRIVAL_INTERVAL);
    }
    block.deactivate();
    Ok(())
}

fn display_spectrogram(view: &mut SpectrogramView) {
    let selections = view.subscribe();
    let mut reported = 0;
    while view.wait().is_some() {
        if view.rows_received() / REPORT_EVERY <= reported {
            continue;
        }
        reported = view.rows_received() / REPORT_EVERY;

        let axes = *view.axes();
        let Some(newest) = view.raster().row(0) else {
            continue;
        };
        let Some(peak) = newest.peak_bin() else {
            continue;
        };
        let interval = axes.x_interval();
        let last = newest.len().saturating_sub(1).max(1);
        let x = interval.min + interval.width() * peak as f64 / last as f64;
        let level = view.sample_clamped(x, 0.0).unwrap_or(f64::NAN);
        let latency = newest.timestamp.elapsed();
        view.select(x);
        while let Ok(hz) = selections.try_recv() {
            info!(
                "[display] {} rows, newest peak at {x:.3} {} ({level:.1} dB, {hz:.1} Hz), {latency:?} old",
                view.rows_received(),
                axes.freq_unit.label(),
            );
        }
    }
    let axes = view.axes();
    info!(
        "[display] '{}' closed after {} rows; history {}s shown as {} {} (axes x={}, y={})",
        view.title(),
        view.rows_received(),
        axes.time_span,
        axes.scaled_span,
        axes.time_unit.label(),
        view.x_axis_enabled(),
        view.y_axis_enabled()
    );
}

fn run_freq_domain(settings: &Settings, format: SampleFormat) -> Result<()> {
    let (mut block, mut view) = FreqDomainBlock::new(format);
    settings.apply_to_freq_domain(&mut block);
    block.activate()?;
    info!(
        "[main] spectrum '{}': {} Hz, {} bins, {} input(s) refreshed at {} Hz",
        block.title(),
        block.sample_rate(),
        block.num_fft_bins(),
        block.num_inputs(),
        block.display_rate()
    );

    let sources = (0..block.num_inputs())
        .map(|index| ToneSource::new(format, SWEEP_PER_BLOCK * (index + 1) as f64))
        .collect::<Result<Vec<_>, _>>()?;
    let deadline = run_deadline(settings);
    let handle = thread::Builder::new()
        .name("spectroscope-source".into())
        .spawn(move || feed_freq_domain(block, sources, deadline))
        .context("failed to spawn source thread")?;

    display_freq_domain(&mut view);
    join_source(handle)
}

fn feed_freq_domain(
    mut block: FreqDomainBlock,
    mut sources: Vec<ToneSource>,
    deadline: Instant,
) -> Result<(), ConfigurationError> {
    let elements = block.num_fft_bins();
    while Instant::now() < deadline {
        for (index, source) in sources.iter_mut().enumerate() {
            block.accept(index, &source.next_block(elements));
        }
        let ready = (0..block.num_inputs())
            .filter_map(|index| block.input(index))
            .any(InputPort::is_ready);
        if ready && let ProcessorUpdate::Snapshot(update) = block.work(Instant::now())? {
            debug!(
                "[source] curves for inputs {:?}, degraded={}",
                update.inputs, update.degraded
            );
        }
        thread::sleep(ARRIVAL_INTERVAL);
    }
    block.deactivate();
    Ok(())
}

fn display_freq_domain(view: &mut SpectrumView) {
    let floor = view.y_interval().min;
    while !view.is_closed() {
        if view.drain() == 0 {
            thread::sleep(ARRIVAL_INTERVAL);
            continue;
        }
        let axes = *view.axes();
        let mut input = 0;
        while let Some(curve) = view.curve(input) {
            let centre = view.sample(input, 0.0).unwrap_or(floor).max(floor);
            info!(
                "[display] input {input}: peak bin {:?}, {centre:.1} dB at DC ({} axis)",
                curve.peak_bin(),
                axes.freq_unit.label()
            );
            input += 1;
        }
    }
    info!(
        "[display] '{}' closed (axes x={}, y={})",
        view.title(),
        view.x_axis_enabled(),
        view.y_axis_enabled()
    );
}
