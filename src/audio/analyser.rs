//! Byte-scaled frequency analysis of a sample window.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::AnalyserConfig;

/// FFT analyser producing smoothed 0-255 energies per frequency bin
///
/// Each call windows the most recent `fft_size` samples (Blackman), takes
/// the magnitude spectrum, blends it with the previous frame using the
/// smoothing constant, converts to decibels and maps
/// `[min_decibels, max_decibels]` linearly onto `0..=255`.
pub struct FrequencyAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, String> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();

        Ok(Self {
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.bin_count()],
            fft,
            window,
            config,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// Analyse the newest samples and write one byte per bin into `out`
    ///
    /// Fewer than `fft_size` samples are treated as zero-padded at the start.
    pub fn analyse(&mut self, samples: &[f32], out: &mut Vec<u8>) {
        let n = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(n)..];
        let pad = n - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing_time_constant;
        let db_range = self.config.max_decibels - self.config.min_decibels;

        out.clear();
        for (bin, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[bin].norm() / n as f32;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            let byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (255.0 / db_range * (db - self.config.min_decibels)).clamp(0.0, 255.0) as u8
            } else {
                0
            };
            out.push(byte);
        }
    }
}

/// Blackman window function (a = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}
