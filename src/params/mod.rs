//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (pixels, radians, decibels, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod render;
mod visual;

// Re-export all types
pub use audio::{AnalyserConfig, AudioReactiveMapping};
pub use render::RenderConfig;
pub use visual::{hex_to_rgb, visual_constants, ShaderStyle, VisualLimits};
