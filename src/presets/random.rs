//! Ad hoc randomized bundles, kept apart from the preset table.

use rand::Rng;

use super::ParameterBundle;
use crate::params::visual_constants::{MAX_SEGMENTS, MIN_SEGMENTS};

/// Bundle with random segment counts
///
/// Shader fields (frequency, amplitude, point size) come from `live`;
/// offset divisor and camera distance reset to their defaults.
pub fn random_bundle<R: Rng + ?Sized>(rng: &mut R, live: &ParameterBundle) -> ParameterBundle {
    ParameterBundle {
        name: "Random".to_string(),
        frequency: live.frequency,
        amplitude: live.amplitude,
        point_size: live.point_size,
        width_segments: rng.gen_range(MIN_SEGMENTS..=MAX_SEGMENTS),
        height_segments: rng.gen_range(MIN_SEGMENTS..=MAX_SEGMENTS),
        depth_segments: rng.gen_range(MIN_SEGMENTS..=MAX_SEGMENTS),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tuned() -> ParameterBundle {
        ParameterBundle {
            frequency: 2.5,
            amplitude: 1.75,
            point_size: 0.75,
            offset_divisor: Some(30.0),
            camera_distance: 12.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_random_bundle_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let live = ParameterBundle::default();
        for _ in 0..200 {
            let bundle = random_bundle(&mut rng, &live);
            for n in [
                bundle.width_segments,
                bundle.height_segments,
                bundle.depth_segments,
            ] {
                assert!((MIN_SEGMENTS..=MAX_SEGMENTS).contains(&n));
            }
        }
    }

    #[test]
    fn test_random_bundle_seeded_is_reproducible() {
        let a = random_bundle(&mut StdRng::seed_from_u64(42), &tuned());
        let b = random_bundle(&mut StdRng::seed_from_u64(42), &tuned());
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_bundle_keeps_live_shader_fields() {
        let bundle = random_bundle(&mut StdRng::seed_from_u64(1), &tuned());
        assert_eq!(bundle.frequency, 2.5);
        assert_eq!(bundle.amplitude, 1.75);
        assert_eq!(bundle.point_size, 0.75);
    }

    #[test]
    fn test_random_bundle_resets_offset_and_camera() {
        let bundle = random_bundle(&mut StdRng::seed_from_u64(1), &tuned());
        let defaults = ParameterBundle::default();
        assert_eq!(bundle.camera_distance, defaults.camera_distance);
        assert_eq!(bundle.offset_divisor, None);
        assert_eq!(bundle.offset_divisor(), defaults.offset_divisor());
    }
}
