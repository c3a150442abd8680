//! Shader uniform values owned by the controller.

use crate::params::ShaderStyle;
use crate::presets::ParameterBundle;

/// Uniform values consumed by the point shader
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderUniforms {
    /// Elapsed animation time
    pub time: f32,
    /// Point size (pixels)
    pub size: f32,
    pub frequency: f32,
    pub amplitude: f32,
    /// Bass-driven vertical offset
    pub offset_gain: f32,
    pub max_distance: f32,
    /// sRGB colours blended by distance from the origin
    pub start_color: [f32; 3],
    pub end_color: [f32; 3],
}

impl ShaderUniforms {
    pub fn new(bundle: &ParameterBundle, style: &ShaderStyle) -> Self {
        Self {
            time: 0.0,
            size: bundle.point_size,
            frequency: bundle.frequency,
            amplitude: bundle.amplitude,
            offset_gain: 0.0,
            max_distance: style.max_distance,
            start_color: style.start_color,
            end_color: style.end_color,
        }
    }

    /// Copy the bundle's shader fields, resetting the audio-driven offset
    pub fn apply_bundle(&mut self, bundle: &ParameterBundle) {
        self.size = bundle.point_size;
        self.frequency = bundle.frequency;
        self.amplitude = bundle.amplitude;
        self.offset_gain = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_bundle_keeps_time_and_style() {
        let style = ShaderStyle::default();
        let mut uniforms = ShaderUniforms::new(&ParameterBundle::default(), &style);
        uniforms.time = 3.0;
        uniforms.offset_gain = 1.5;

        let bundle = ParameterBundle {
            frequency: 2.0,
            amplitude: 1.25,
            point_size: 0.75,
            ..Default::default()
        };
        uniforms.apply_bundle(&bundle);

        assert_eq!(uniforms.time, 3.0);
        assert_eq!(uniforms.frequency, 2.0);
        assert_eq!(uniforms.amplitude, 1.25);
        assert_eq!(uniforms.size, 0.75);
        assert_eq!(uniforms.offset_gain, 0.0);
        assert_eq!(uniforms.max_distance, style.max_distance);
        assert_eq!(uniforms.start_color, style.start_color);
    }
}
