//! Geometry limits, panel ranges and shader styling.

use std::ops::RangeInclusive;

/// Compile-time visual constants
pub mod visual_constants {
    /// Physical box dimensions (width, height, depth in world units)
    pub const BOX_SIZE: [f32; 3] = [4.0, 1.0, 1.0];

    /// Segment count bounds per box axis
    pub const MIN_SEGMENTS: u32 = 1;
    pub const MAX_SEGMENTS: u32 = 80;

    /// Rotation added to the X and Y axes each tick while rotating (radians)
    pub const ROTATION_STEP_RAD: f32 = 0.01;

    /// Shader time advanced each tick
    pub const TIME_STEP: f32 = 0.1;

    /// Divisor for bass → offset gain when a preset does not provide one
    pub const DEFAULT_OFFSET_DIVISOR: f32 = 80.0;

    /// Default shader wave frequency
    pub const DEFAULT_FREQUENCY: f32 = 0.5;

    /// Default shader wave amplitude
    pub const DEFAULT_AMPLITUDE: f32 = 0.8;

    /// Default camera distance from the origin along +Z
    pub const DEFAULT_CAMERA_DISTANCE: f32 = 4.0;
}

/// Ranges enforced by the panel mutators
#[derive(Debug, Clone)]
pub struct VisualLimits {
    /// Shader wave frequency
    pub frequency: RangeInclusive<f32>,

    /// Shader wave amplitude
    pub amplitude: RangeInclusive<f32>,

    /// Point size (pixels)
    pub point_size: RangeInclusive<f32>,

    /// Bass → offset gain divisor
    pub offset_divisor: RangeInclusive<f32>,

    /// Camera distance (world units)
    pub camera_distance: RangeInclusive<f32>,
}

impl Default for VisualLimits {
    fn default() -> Self {
        Self {
            frequency: 0.0..=5.0,
            amplitude: 0.0..=5.0,
            point_size: 0.5..=3.0,
            offset_divisor: 0.0..=100.0,
            camera_distance: 0.0..=30.0,
        }
    }
}

impl VisualLimits {
    /// Clamp `value` into `range`, mapping NaN to the lower bound
    pub fn clamp(range: &RangeInclusive<f32>, value: f32) -> f32 {
        if value.is_nan() {
            return *range.start();
        }
        value.clamp(*range.start(), *range.end())
    }
}

/// Colour and falloff styling for the point shader
#[derive(Debug, Clone)]
pub struct ShaderStyle {
    /// Distance from the origin at which the colour reaches `end_color`
    pub max_distance: f32,

    /// Colour near the origin (sRGB)
    pub start_color: [f32; 3],

    /// Colour at `max_distance` (sRGB)
    pub end_color: [f32; 3],
}

impl Default for ShaderStyle {
    fn default() -> Self {
        Self {
            max_distance: 1.8,
            start_color: hex_to_rgb(0x272e29), // dark green
            end_color: hex_to_rgb(0xfffcb6),   // pale yellow
        }
    }
}

/// Convert a 0xRRGGBB value into normalized sRGB components
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
