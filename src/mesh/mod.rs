//! Point-sampled box surface built from per-axis segment counts.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::params::visual_constants::{BOX_SIZE, MAX_SEGMENTS, MIN_SEGMENTS};

/// Vertex data for the point cloud (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Segment counts along the box's width, height and depth
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SegmentTriple {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl SegmentTriple {
    /// Build a triple with each count clamped into `[MIN_SEGMENTS, MAX_SEGMENTS]`
    pub fn clamped(width: i64, height: i64, depth: i64) -> Self {
        let clamp = |n: i64| n.clamp(MIN_SEGMENTS as i64, MAX_SEGMENTS as i64) as u32;
        Self {
            width: clamp(width),
            height: clamp(height),
            depth: clamp(depth),
        }
    }

    /// Total number of sampled points on the box surface
    pub fn point_count(&self) -> usize {
        let (w, h, d) = (
            self.width as usize + 1,
            self.height as usize + 1,
            self.depth as usize + 1,
        );
        2 * (w * h + d * h + w * d)
    }
}

impl std::fmt::Display for SegmentTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Point cloud sampling the surface of a `BOX_SIZE` box
#[derive(Debug, Clone)]
pub struct PointMesh {
    pub vertices: Vec<Vertex>,
    segments: SegmentTriple,
}

impl PointMesh {
    /// Build the point cloud for a (pre-sanitized) segment triple
    ///
    /// Each face contributes an `(a + 1) x (b + 1)` grid of points, where `a`
    /// and `b` are the segment counts along the face's two axes. Edge points
    /// are shared by two faces and appear once per face.
    pub fn build(segments: SegmentTriple) -> Self {
        let [w, h, d] = BOX_SIZE;
        let (sw, sh, sd) = (segments.width, segments.height, segments.depth);

        let mut vertices = Vec::with_capacity(segments.point_count());

        // +X / -X faces span depth x height
        push_face(&mut vertices, Vec3::X * w / 2.0, -Vec3::Z * d, Vec3::Y * h, sd, sh);
        push_face(&mut vertices, -Vec3::X * w / 2.0, Vec3::Z * d, Vec3::Y * h, sd, sh);

        // +Y / -Y faces span width x depth
        push_face(&mut vertices, Vec3::Y * h / 2.0, Vec3::X * w, -Vec3::Z * d, sw, sd);
        push_face(&mut vertices, -Vec3::Y * h / 2.0, Vec3::X * w, Vec3::Z * d, sw, sd);

        // +Z / -Z faces span width x height
        push_face(&mut vertices, Vec3::Z * d / 2.0, Vec3::X * w, Vec3::Y * h, sw, sh);
        push_face(&mut vertices, -Vec3::Z * d / 2.0, -Vec3::X * w, Vec3::Y * h, sw, sh);

        Self { vertices, segments }
    }

    pub fn segments(&self) -> SegmentTriple {
        self.segments
    }

    pub fn point_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Append one face grid centred at `center`, spanning `u` and `v`
fn push_face(
    vertices: &mut Vec<Vertex>,
    center: Vec3,
    u: Vec3,
    v: Vec3,
    u_segs: u32,
    v_segs: u32,
) {
    for iy in 0..=v_segs {
        let fv = iy as f32 / v_segs as f32;
        for ix in 0..=u_segs {
            let fu = ix as f32 / u_segs as f32;
            let position = center + u * (fu - 0.5) + v * (fv - 0.5);
            vertices.push(Vertex {
                position: position.to_array(),
                uv: [fu, 1.0 - fv],
            });
        }
    }
}
