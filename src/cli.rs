//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::params::RenderConfig;
use crate::presets::{PresetError, PresetTable};
use crate::schedule::{AutoCycle, CycleMode};

/// Interval used when auto-cycle is toggled on without `--auto-cycle`
const DEFAULT_AUTO_CYCLE_INTERVAL: Duration = Duration::from_secs(10);

/// Parse a positive, representable number of seconds
fn parse_interval(value: &str) -> Result<Duration, String> {
    let seconds: f32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("interval must be a positive number of seconds, got {}", value));
    }
    Duration::try_from_secs_f32(seconds)
        .map_err(|_| format!("interval of {} seconds is too large", value))
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Vibebox")]
#[command(about = "Audio-reactive 3D point-cloud visualizer", long_about = None)]
pub struct Args {
    /// JSON preset table (default: built-in presets)
    #[arg(long, value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// Initial preset index (zero-based)
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub preset: usize,

    /// Start on a random bundle instead of a preset
    #[arg(long)]
    pub random: bool,

    /// Start with rotation enabled
    #[arg(long)]
    pub rotate: bool,

    /// Change preset automatically every SECONDS
    #[arg(long, value_name = "SECONDS", value_parser = parse_interval)]
    pub auto_cycle: Option<Duration>,

    /// What auto-cycle does when it fires
    #[arg(long, value_enum, default_value_t = CycleMode::Sequential)]
    pub auto_mode: CycleMode,

    /// Never request the microphone
    #[arg(long)]
    pub no_capture: bool,

    /// Print the built-in preset table as JSON and exit
    #[arg(long)]
    pub dump_presets: bool,

    /// Initial window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Initial window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,
}

impl Args {
    /// Load the preset table from `--presets`, or the built-in one
    pub fn load_presets(&self) -> Result<PresetTable, PresetError> {
        match &self.presets {
            Some(path) => PresetTable::from_json_file(path),
            None => Ok(PresetTable::builtin()),
        }
    }

    /// Validate `--preset` against the loaded table
    pub fn initial_preset(&self, table: &PresetTable) -> Result<usize, PresetError> {
        table.get(self.preset).map(|_| self.preset)
    }

    /// Auto-cycle timer, enabled only when `--auto-cycle` was given
    pub fn create_auto_cycle(&self, now: Instant) -> AutoCycle {
        let interval = self.auto_cycle.unwrap_or(DEFAULT_AUTO_CYCLE_INTERVAL);
        let mut cycle = AutoCycle::new(interval, self.auto_mode, now);
        if self.auto_cycle.is_none() {
            cycle.set_enabled(false, now);
        }
        cycle
    }

    /// Render configuration with the requested window size
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            ..Default::default()
        }
    }
}
