//! Microphone analysis configuration and constants.

use std::ops::Range;

/// Frequency analyser configuration (mirrors a browser analyser node)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// FFT window size in samples (must be power of 2)
    /// 256 samples = 128 frequency bins
    pub fft_size: usize,

    /// Analysis update interval (milliseconds)
    /// 16ms ≈ one refresh at 60 Hz
    pub update_interval_ms: u64,

    /// Temporal smoothing between analysis frames (0 = none, <1)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte value 0 (decibels)
    pub min_decibels: f32,

    /// Magnitude mapped to byte value 255 (decibels)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            update_interval_ms: 16,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per analysis frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(format!(
                "FFT size must be a power of 2 and at least 32, got {}",
                self.fft_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "Smoothing constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "Decibel range is empty: [{}, {}]",
                self.min_decibels, self.max_decibels
            ));
        }
        Ok(())
    }
}

/// Mapping from analyser bins to visual parameters
#[derive(Debug, Clone)]
pub struct AudioReactiveMapping {
    /// Bins averaged into the bass energy
    pub bass_bins: Range<usize>,

    /// Bins summed into the treble energy (clamped to what the analyser provides)
    pub treble_bins: Range<usize>,

    /// Divisor: average energy → amplitude
    /// Formula: amplitude = max(amplitude_floor, avg / this)
    pub avg_to_amplitude_divisor: f32,

    /// Lower bound on the audio-driven amplitude
    pub amplitude_floor: f32,
}

impl Default for AudioReactiveMapping {
    fn default() -> Self {
        Self {
            bass_bins: 0..10,
            treble_bins: 80..128,
            avg_to_amplitude_divisor: 100.0,
            amplitude_floor: 0.8,
        }
    }
}
