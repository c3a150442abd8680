//! Fixed perspective camera on the +Z axis and the box's model transform.

use glam::{EulerRot, Mat4, Vec2, Vec3};

use crate::params::RenderConfig;

/// Camera looking down -Z at the origin from a configurable distance
pub struct CameraSystem;

impl CameraSystem {
    /// Camera position for a given distance along +Z
    pub fn eye_position(distance: f32) -> Vec3 {
        Vec3::new(0.0, 0.0, distance)
    }

    /// Create view-projection matrix for rendering
    ///
    /// The camera never rotates, so the view is a pure translation; this
    /// stays well-defined at distance 0 where a look-at would degenerate.
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(distance: f32, render_config: &RenderConfig) -> (Mat4, Vec3) {
        let eye = Self::eye_position(distance);

        let view = Mat4::from_translation(-eye);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );

        (proj * view, eye)
    }

    /// Model matrix for the point cloud's X/Y rotation (X applied outermost)
    pub fn model_matrix(rotation: Vec2) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, rotation.x, rotation.y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_proj_matrix_generation() {
        let render_config = RenderConfig::default();

        let (view_proj, eye_pos) = CameraSystem::create_view_proj_matrix(4.0, &render_config);

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert_eq!(eye_pos, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_origin_projects_to_screen_centre() {
        let render_config = RenderConfig::default();
        let (view_proj, _) = CameraSystem::create_view_proj_matrix(4.0, &render_config);

        let clip = view_proj * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        // In front of the camera, inside the depth range
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_zero_distance_is_finite() {
        let render_config = RenderConfig::default();
        let (view_proj, _) = CameraSystem::create_view_proj_matrix(0.0, &render_config);
        assert!(view_proj.is_finite());
    }

    #[test]
    fn test_model_matrix_without_rotation_is_identity() {
        assert_eq!(CameraSystem::model_matrix(Vec2::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn test_model_matrix_rotates_about_y() {
        let model = CameraSystem::model_matrix(Vec2::new(0.0, std::f32::consts::FRAC_PI_2));
        let rotated = model.transform_point3(Vec3::X);
        assert!((rotated - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
