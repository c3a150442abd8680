//! Coarse band energies extracted from analyser bins.

use std::ops::Range;

use crate::params::AudioReactiveMapping;

/// Band energies for one frame (same 0-255 scale as the bins)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioFeatures {
    /// Mean over all bins
    pub average: f32,
    /// Mean over the bass bins
    pub bass: f32,
    /// Sum over the treble bins that exist
    pub treble: f32,
}

impl AudioFeatures {
    /// Extract band energies; bands beyond the array length are truncated
    pub fn extract(energies: &[u8], mapping: &AudioReactiveMapping) -> Self {
        let sum = |range: Range<usize>| -> f32 {
            energies[clamp_range(range, energies.len())]
                .iter()
                .map(|&b| b as f32)
                .sum()
        };

        let average = if energies.is_empty() {
            0.0
        } else {
            sum(0..energies.len()) / energies.len() as f32
        };

        // Bass is divided by the nominal band width even when truncated
        let bass_width = mapping.bass_bins.len().max(1) as f32;

        Self {
            average,
            bass: sum(mapping.bass_bins.clone()) / bass_width,
            treble: sum(mapping.treble_bins.clone()),
        }
    }

    /// Audio-driven wave amplitude
    pub fn amplitude(&self, mapping: &AudioReactiveMapping) -> f32 {
        (self.average / mapping.avg_to_amplitude_divisor).max(mapping.amplitude_floor)
    }

    /// Audio-driven offset gain; a zero divisor yields 0
    pub fn offset_gain(&self, divisor: f32) -> f32 {
        if divisor == 0.0 {
            0.0
        } else {
            self.bass / divisor
        }
    }
}

fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_energies() {
        let mapping = AudioReactiveMapping::default();
        let features = AudioFeatures::extract(&[80; 128], &mapping);

        assert_eq!(features.average, 80.0);
        assert_eq!(features.bass, 80.0);
        assert_eq!(features.treble, 80.0 * 48.0);
        assert!((features.amplitude(&mapping) - 0.8).abs() < 1e-6);
        assert_eq!(features.offset_gain(80.0), 1.0);
    }

    #[test]
    fn test_loud_input_raises_amplitude() {
        let mapping = AudioReactiveMapping::default();
        let features = AudioFeatures::extract(&[250; 128], &mapping);
        assert!((features.amplitude(&mapping) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_quiet_input_is_floored() {
        let mapping = AudioReactiveMapping::default();
        let features = AudioFeatures::extract(&[0; 128], &mapping);
        assert_eq!(features.amplitude(&mapping), mapping.amplitude_floor);
    }

    #[test]
    fn test_short_array_truncates_bands() {
        let mapping = AudioReactiveMapping::default();
        let features = AudioFeatures::extract(&[100; 90], &mapping);

        // Only bins 80..90 exist for treble
        assert_eq!(features.treble, 1000.0);
        assert_eq!(features.bass, 100.0);

        let tiny = AudioFeatures::extract(&[100; 5], &mapping);
        assert_eq!(tiny.treble, 0.0);
        assert_eq!(tiny.bass, 50.0);
    }

    #[test]
    fn test_empty_array() {
        let mapping = AudioReactiveMapping::default();
        let features = AudioFeatures::extract(&[], &mapping);
        assert_eq!(features, AudioFeatures::default());
    }

    #[test]
    fn test_zero_divisor_gives_zero_gain() {
        let features = AudioFeatures {
            bass: 120.0,
            ..Default::default()
        };
        assert_eq!(features.offset_gain(0.0), 0.0);
        assert_eq!(features.offset_gain(60.0), 2.0);
    }
}
