//! Rendering configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,

    /// Clear colour (RGBA, alpha 0 = transparent background)
    pub clear_color: [f64; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 70.0,
            near_plane: 0.1,
            far_plane: 10_000.0,
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        // Minimised windows report zero height
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        let config = RenderConfig::default();
        assert!((config.aspect_ratio() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        let config = RenderConfig {
            window_height: 0,
            ..Default::default()
        };
        assert!(config.aspect_ratio().is_finite());
    }
}
