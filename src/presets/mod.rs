//! Ordered, immutable table of visual parameter presets.

mod random;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::mesh::SegmentTriple;
use crate::params::{visual_constants, VisualLimits};

pub use random::random_bundle;

/// Errors from loading or indexing the preset table
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("preset index {index} out of range (table has {count} presets)")]
    OutOfRange { index: usize, count: usize },
    #[error("preset table is empty")]
    Empty,
    #[error("failed to read presets at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse presets at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode presets: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One bundle of visual parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBundle {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Shader wave frequency
    pub frequency: f32,

    /// Shader wave amplitude (overridden by audio once capture is active)
    pub amplitude: f32,

    /// Point size (pixels)
    pub point_size: f32,

    /// Segment counts along width, height and depth
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,

    /// Divisor turning bass energy into the offset gain uniform
    /// `None` = `DEFAULT_OFFSET_DIVISOR`
    #[serde(default, alias = "offset_gain", skip_serializing_if = "Option::is_none")]
    pub offset_divisor: Option<f32>,

    /// Camera distance from the origin (world units)
    pub camera_distance: f32,
}

impl Default for ParameterBundle {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            frequency: visual_constants::DEFAULT_FREQUENCY,
            amplitude: visual_constants::DEFAULT_AMPLITUDE,
            point_size: 2.0,
            width_segments: 40,
            height_segments: 10,
            depth_segments: 10,
            offset_divisor: None,
            camera_distance: visual_constants::DEFAULT_CAMERA_DISTANCE,
        }
    }
}

impl ParameterBundle {
    /// Segment triple, clamped into the mesh factory's range
    pub fn segments(&self) -> SegmentTriple {
        SegmentTriple::clamped(
            self.width_segments as i64,
            self.height_segments as i64,
            self.depth_segments as i64,
        )
    }

    /// Offset divisor, falling back to the default constant
    pub fn offset_divisor(&self) -> f32 {
        self.offset_divisor
            .unwrap_or(visual_constants::DEFAULT_OFFSET_DIVISOR)
    }

    /// Copy with every field clamped into its documented range
    pub fn sanitized(&self, limits: &VisualLimits) -> Self {
        let segments = self.segments();
        Self {
            name: self.name.clone(),
            frequency: VisualLimits::clamp(&limits.frequency, self.frequency),
            amplitude: VisualLimits::clamp(&limits.amplitude, self.amplitude),
            point_size: VisualLimits::clamp(&limits.point_size, self.point_size),
            width_segments: segments.width,
            height_segments: segments.height,
            depth_segments: segments.depth,
            offset_divisor: self
                .offset_divisor
                .map(|d| VisualLimits::clamp(&limits.offset_divisor, d)),
            camera_distance: VisualLimits::clamp(&limits.camera_distance, self.camera_distance),
        }
    }
}

/// Fixed ordered sequence of presets, immutable after load
#[derive(Debug, Clone)]
pub struct PresetTable {
    presets: Vec<ParameterBundle>,
}

impl PresetTable {
    /// Create a table from bundles (sanitized, must not be empty)
    pub fn new(presets: Vec<ParameterBundle>) -> Result<Self, PresetError> {
        if presets.is_empty() {
            return Err(PresetError::Empty);
        }
        let limits = VisualLimits::default();
        Ok(Self {
            presets: presets.iter().map(|p| p.sanitized(&limits)).collect(),
        })
    }

    /// Built-in preset table
    pub fn builtin() -> Self {
        Self {
            presets: builtin_presets(),
        }
    }

    /// Load a JSON array of bundles from disk
    pub fn from_json_file(path: &Path) -> Result<Self, PresetError> {
        let text = std::fs::read_to_string(path).map_err(|source| PresetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let presets: Vec<ParameterBundle> =
            serde_json::from_str(&text).map_err(|source| PresetError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded {} presets from {}", presets.len(), path.display());
        Self::new(presets)
    }

    /// Pretty JSON for the whole table (same shape `from_json_file` reads)
    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    /// Bundle at `index`
    pub fn get(&self, index: usize) -> Result<&ParameterBundle, PresetError> {
        self.presets.get(index).ok_or_else(|| PresetError::OutOfRange {
            index,
            count: self.presets.len(),
        })
    }

    /// First bundle (tables are never empty)
    pub fn first(&self) -> &ParameterBundle {
        &self.presets[0]
    }

    /// Index after `index`, wrapping to 0 past the end
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.presets.len()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Always false; construction rejects empty tables
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterBundle> {
        self.presets.iter()
    }
}

fn builtin_presets() -> Vec<ParameterBundle> {
    let preset = |name: &str,
                  frequency: f32,
                  amplitude: f32,
                  point_size: f32,
                  (w, h, d): (u32, u32, u32),
                  offset_divisor: Option<f32>,
                  camera_distance: f32| ParameterBundle {
        name: name.to_string(),
        frequency,
        amplitude,
        point_size,
        width_segments: w,
        height_segments: h,
        depth_segments: d,
        offset_divisor,
        camera_distance,
    };

    vec![
        preset("Drift", 0.5, 0.8, 2.0, (40, 10, 10), Some(80.0), 4.0),
        preset("Lattice", 1.2, 1.0, 1.5, (80, 20, 20), Some(60.0), 5.0),
        preset("Sparse", 0.3, 0.8, 3.0, (8, 4, 4), Some(80.0), 3.5),
        preset("Column", 2.0, 1.5, 1.0, (12, 80, 12), Some(40.0), 6.0),
        preset("Ribbon", 3.5, 0.9, 1.25, (80, 2, 40), None, 4.5),
        preset("Storm", 4.5, 2.0, 0.75, (64, 64, 64), Some(20.0), 8.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_has_six_presets() {
        let table = PresetTable::builtin();
        assert_eq!(table.len(), 6);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_get_out_of_range() {
        let table = PresetTable::builtin();
        assert!(table.get(5).is_ok());
        match table.get(6) {
            Err(PresetError::OutOfRange { index, count }) => {
                assert_eq!(index, 6);
                assert_eq!(count, 6);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_next_wraps() {
        let table = PresetTable::builtin();
        assert_eq!(table.next(0), 1);
        assert_eq!(table.next(5), 0);
    }

    #[test]
    fn test_next_cycle_closure() {
        let table = PresetTable::builtin();
        for start in 0..table.len() {
            let mut index = start;
            for _ in 0..table.len() {
                index = table.next(index);
            }
            assert_eq!(index, start);
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(PresetTable::new(vec![]), Err(PresetError::Empty)));
    }

    #[test]
    fn test_new_sanitizes_bundles() {
        let table = PresetTable::new(vec![ParameterBundle {
            width_segments: 0,
            height_segments: 500,
            point_size: 10.0,
            camera_distance: -3.0,
            offset_divisor: Some(250.0),
            ..Default::default()
        }])
        .unwrap();

        let bundle = table.get(0).unwrap();
        assert_eq!(bundle.width_segments, 1);
        assert_eq!(bundle.height_segments, 80);
        assert_eq!(bundle.point_size, 3.0);
        assert_eq!(bundle.camera_distance, 0.0);
        assert_eq!(bundle.offset_divisor, Some(100.0));
    }

    #[test]
    fn test_offset_divisor_defaults() {
        let bundle = ParameterBundle {
            offset_divisor: None,
            ..Default::default()
        };
        assert_eq!(
            bundle.offset_divisor(),
            visual_constants::DEFAULT_OFFSET_DIVISOR
        );
    }

    #[test]
    fn test_json_roundtrip_of_builtin_table() {
        let table = PresetTable::builtin();
        let json = table.to_json().unwrap();
        let parsed: Vec<ParameterBundle> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, builtin_presets());
    }

    #[test]
    fn test_json_accepts_missing_optional_fields() {
        let json = r#"[{
            "frequency": 1.0,
            "amplitude": 1.0,
            "point_size": 2.0,
            "width_segments": 4,
            "height_segments": 4,
            "depth_segments": 4,
            "camera_distance": 4.0
        }]"#;
        let presets: Vec<ParameterBundle> = serde_json::from_str(json).unwrap();
        assert_eq!(presets[0].name, "");
        assert_eq!(presets[0].offset_divisor, None);
    }

    #[test]
    fn test_json_accepts_offset_gain_alias() {
        let json = r#"{
            "frequency": 1.0, "amplitude": 1.0, "point_size": 2.0,
            "width_segments": 4, "height_segments": 4, "depth_segments": 4,
            "offset_gain": 50.0, "camera_distance": 4.0
        }"#;
        let bundle: ParameterBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.offset_divisor, Some(50.0));
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let result = PresetTable::from_json_file(Path::new("/nonexistent/presets.json"));
        assert!(matches!(result, Err(PresetError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "vibebox-bad-presets-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        let result = PresetTable::from_json_file(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(PresetError::Parse { .. })));
    }
}
