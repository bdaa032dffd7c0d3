//! JSON settings applied to a block through its named configuration calls.

use crate::dsp::convert::SampleFormat;
use crate::dsp::spectrogram::SpectrogramBlock;
use crate::dsp::spectrum::FreqDomainBlock;
use crate::ui::visualization::spectrogram::DEFAULT_DISPLAY_ROWS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

fn config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spectroscope")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    #[default]
    Spectrogram,
    FreqDomain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub plot: PlotKind,
    /// Host data-type name, e.g. `complex_float32`.
    pub format: String,
    pub sample_rate: f64,
    pub fft_size: usize,
    pub time_span: f64,
    pub display_rate: f64,
    pub num_inputs: usize,
    pub title: String,
    pub x_axis: bool,
    pub y_axis: bool,
    pub display_rows: usize,
    /// Length of the synthetic demo run, in seconds.
    pub run_seconds: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plot: PlotKind::Spectrogram,
            format: "complex_float32".into(),
            sample_rate: 1.0,
            fft_size: 1024,
            time_span: 10.0,
            display_rate: 1.0,
            num_inputs: 1,
            title: String::new(),
            x_axis: true,
            y_axis: true,
            display_rows: DEFAULT_DISPLAY_ROWS,
            run_seconds: 2.0,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Reads `path`, falling back to defaults when missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            info!("[settings] no settings at {path:?}; using defaults");
            return Self::default();
        };
        serde_json::from_str(&text)
            .map_err(|e| warn!("[settings] parse error {path:?}: {e}"))
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {parent:?}"))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialising settings")?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).with_context(|| format!("writing {temp_path:?}"))?;
        fs::rename(&temp_path, path).with_context(|| format!("replacing {path:?}"))
    }

    pub fn sample_format(&self) -> Result<SampleFormat> {
        self.format
            .parse::<SampleFormat>()
            .with_context(|| format!("invalid sample format in settings: {:?}", self.format))
    }

    pub fn apply_to_spectrogram(&self, block: &mut SpectrogramBlock) {
        block.set_title(self.title.clone());
        block.set_sample_rate(self.sample_rate);
        block.set_num_fft_bins(self.fft_size);
        block.set_time_span(self.time_span);
        block.enable_x_axis(self.x_axis);
        block.enable_y_axis(self.y_axis);
    }

    pub fn apply_to_freq_domain(&self, block: &mut FreqDomainBlock) {
        block.set_num_inputs(self.num_inputs);
        block.set_title(self.title.clone());
        block.set_sample_rate(self.sample_rate);
        block.set_num_fft_bins(self.fft_size);
        block.set_display_rate(self.display_rate);
        block.enable_x_axis(self.x_axis);
        block.enable_y_axis(self.y_axis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fft_size": 64, "plot": "freq_domain" }"#).unwrap();

        let settings = Settings::load_or_default(&path);
        assert_eq!(settings.fft_size, 64);
        assert_eq!(settings.plot, PlotKind::FreqDomain);
        assert_eq!(settings.time_span, 10.0);
        assert_eq!(settings.format, "complex_float32");
    }

    #[test]
    fn malformed_or_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_or_default(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn save_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            sample_rate: 2.4e6,
            title: "RX".into(),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load_or_default(&path), settings);
    }

    #[test]
    fn applies_named_operations_to_blocks() {
        let settings = Settings {
            format: "int16".into(),
            sample_rate: 48e3,
            fft_size: 256,
            time_span: 5.0,
            num_inputs: 3,
            title: "scope".into(),
            ..Settings::default()
        };
        let format = settings.sample_format().unwrap();

        let (mut block, _view) = SpectrogramBlock::new(format);
        settings.apply_to_spectrogram(&mut block);
        assert_eq!(block.title(), "scope");
        assert_eq!(block.num_fft_bins(), 256);
        assert_eq!(block.time_span(), 5.0);
        assert_eq!(block.input().reserve(), 256);

        let (mut plot, _view) = FreqDomainBlock::new(format);
        settings.apply_to_freq_domain(&mut plot);
        assert_eq!(plot.num_inputs(), 3);
        assert_eq!(plot.sample_rate(), 48e3);

        let bad = Settings {
            format: "int12x".into(),
            ..Settings::default()
        };
        assert!(bad.sample_format().is_err());
    }
}
