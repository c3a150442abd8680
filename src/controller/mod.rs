//! Visualization controller: frame-to-frame state and parameter-to-geometry mapping.

mod features;
mod uniforms;

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::audio::{CaptureError, FrequencySource};
use crate::mesh::{PointMesh, SegmentTriple};
use crate::params::visual_constants::{ROTATION_STEP_RAD, TIME_STEP};
use crate::params::{AudioReactiveMapping, ShaderStyle, VisualLimits};
use crate::presets::{random_bundle, ParameterBundle, PresetTable};

pub use features::AudioFeatures;
pub use uniforms::ShaderUniforms;

/// Capture-driven controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No analyser yet; audio-driven uniforms hold their preset defaults
    Initializing,
    /// Analyser attached; audio-driven uniforms update every tick
    Active,
}

/// Mutable live state (edited through the controller's mutators)
#[derive(Debug, Clone, PartialEq)]
pub struct LiveState {
    pub current_preset_index: usize,
    pub rotation_enabled: bool,
    pub elapsed_time: f32,
    pub segments: SegmentTriple,
    pub camera_distance: f32,
}

/// Everything the renderer needs for one frame
pub struct FrameView<'a> {
    pub mesh: &'a PointMesh,
    /// Increments each time the mesh is replaced
    pub mesh_generation: u64,
    pub uniforms: &'a ShaderUniforms,
    /// Rotation about X and Y (radians)
    pub rotation: Vec2,
    pub camera_distance: f32,
}

/// Receives a frame to present at the end of each tick
pub trait FramePresenter {
    fn present(&mut self, frame: &FrameView<'_>);
}

/// Owns the preset table, the live mesh and the shader uniforms
pub struct VisualizationController {
    table: PresetTable,
    state: LiveState,
    mesh: PointMesh,
    mesh_generation: u64,
    uniforms: ShaderUniforms,
    /// Name of the active bundle (preset or random)
    active_name: String,
    offset_divisor: f32,
    rotation: Vec2,
    analyser: Option<Box<dyn FrequencySource>>,
    last_features: AudioFeatures,
    mapping: AudioReactiveMapping,
    limits: VisualLimits,
}

impl VisualizationController {
    /// Create a controller with the first preset active
    pub fn new(table: PresetTable) -> Self {
        let bundle = table.first().clone();
        let segments = bundle.segments();

        Self {
            state: LiveState {
                current_preset_index: 0,
                rotation_enabled: false,
                elapsed_time: 0.0,
                segments,
                camera_distance: bundle.camera_distance,
            },
            mesh: PointMesh::build(segments),
            mesh_generation: 0,
            uniforms: ShaderUniforms::new(&bundle, &ShaderStyle::default()),
            active_name: bundle.name.clone(),
            offset_divisor: bundle.offset_divisor(),
            rotation: Vec2::ZERO,
            analyser: None,
            last_features: AudioFeatures::default(),
            mapping: AudioReactiveMapping::default(),
            limits: VisualLimits::default(),
            table,
        }
    }

    // === Preset activation ===

    /// Activate the preset at `index`, rebuilding the mesh
    ///
    /// An out-of-range index is a caller bug: it asserts in debug builds and
    /// is ignored in release builds.
    pub fn activate_preset(&mut self, index: usize) {
        let bundle = match self.table.get(index) {
            Ok(bundle) => bundle.clone(),
            Err(e) => {
                if cfg!(debug_assertions) {
                    panic!("activate_preset: {}", e);
                }
                log::error!("Ignoring preset activation: {}", e);
                return;
            }
        };

        self.state.current_preset_index = index;
        self.apply_bundle(&bundle);
        log::info!(
            "Preset {}/{} '{}' ({})",
            index + 1,
            self.table.len(),
            bundle.name,
            self.state.segments
        );
    }

    /// Activate the next preset, wrapping after the last one
    pub fn advance_preset(&mut self) {
        let next = self.table.next(self.state.current_preset_index);
        self.activate_preset(next);
    }

    /// Activate a bundle with random segment counts
    pub fn activate_random_preset(&mut self) {
        self.activate_random_preset_with(&mut rand::thread_rng());
    }

    /// Activate a random bundle drawn from `rng`
    ///
    /// Live frequency, amplitude and point size carry over. The preset index
    /// is left untouched so advancing continues from it.
    pub fn activate_random_preset_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let bundle = random_bundle(rng, &self.live_bundle());
        self.apply_bundle(&bundle);
        log::info!("Random bundle ({})", self.state.segments);
    }

    /// Snapshot of the live parameters as a bundle
    fn live_bundle(&self) -> ParameterBundle {
        let segments = self.state.segments;
        ParameterBundle {
            name: self.active_name.clone(),
            frequency: self.uniforms.frequency,
            amplitude: self.uniforms.amplitude,
            point_size: self.uniforms.size,
            width_segments: segments.width,
            height_segments: segments.height,
            depth_segments: segments.depth,
            offset_divisor: Some(self.offset_divisor),
            camera_distance: self.state.camera_distance,
        }
    }

    fn apply_bundle(&mut self, bundle: &ParameterBundle) {
        self.uniforms.apply_bundle(bundle);
        self.offset_divisor = bundle.offset_divisor();
        self.state.camera_distance = bundle.camera_distance;
        self.active_name = bundle.name.clone();
        self.replace_mesh(bundle.segments());
    }

    /// Swap in a freshly built mesh; the old one is dropped
    fn replace_mesh(&mut self, segments: SegmentTriple) {
        self.mesh = PointMesh::build(segments);
        self.mesh_generation += 1;
        self.state.segments = segments;
        log::debug!(
            "Rebuilt mesh {} ({} points, generation {})",
            segments,
            self.mesh.point_count(),
            self.mesh_generation
        );
    }

    // === Panel mutators ===

    /// Set segment counts (clamped into range); rebuilds only on change
    ///
    /// Returns whether the mesh was rebuilt.
    pub fn set_segments(&mut self, width: i64, height: i64, depth: i64) -> bool {
        let segments = SegmentTriple::clamped(width, height, depth);
        if segments == self.state.segments {
            return false;
        }
        self.replace_mesh(segments);
        true
    }

    pub fn set_rotation(&mut self, enabled: bool) {
        self.state.rotation_enabled = enabled;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.uniforms.frequency = VisualLimits::clamp(&self.limits.frequency, frequency);
    }

    /// Set the wave amplitude (overwritten every tick once capture is active)
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.uniforms.amplitude = VisualLimits::clamp(&self.limits.amplitude, amplitude);
    }

    pub fn set_point_size(&mut self, size: f32) {
        self.uniforms.size = VisualLimits::clamp(&self.limits.point_size, size);
    }

    pub fn set_offset_divisor(&mut self, divisor: f32) {
        self.offset_divisor = VisualLimits::clamp(&self.limits.offset_divisor, divisor);
    }

    pub fn set_camera_distance(&mut self, distance: f32) {
        self.state.camera_distance = VisualLimits::clamp(&self.limits.camera_distance, distance);
    }

    // === Capture ===

    /// Switch to the Active phase; ignored if an analyser is already attached
    pub fn attach_analyser(&mut self, analyser: Box<dyn FrequencySource>) -> bool {
        if self.analyser.is_some() {
            log::warn!("Analyser already attached; ignoring second capture");
            return false;
        }
        self.analyser = Some(analyser);
        true
    }

    /// Apply the outcome of a capture request
    ///
    /// A failure is logged and leaves the controller Initializing, so the
    /// preset's amplitude and offset keep driving the shader. Returns whether
    /// an analyser was attached.
    pub fn resolve_capture<S>(&mut self, result: Result<S, CaptureError>) -> bool
    where
        S: FrequencySource + 'static,
    {
        match result {
            Ok(source) => self.attach_analyser(Box::new(source)),
            Err(e) => {
                log::error!("Microphone capture failed: {}", e);
                false
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.analyser.is_some() {
            Phase::Active
        } else {
            Phase::Initializing
        }
    }

    // === Frame ===

    /// Advance one frame and hand the result to `presenter`
    pub fn tick<P: FramePresenter + ?Sized>(&mut self, presenter: &mut P) {
        if let Some(analyser) = self.analyser.as_mut() {
            let features = AudioFeatures::extract(analyser.read_energies(), &self.mapping);
            self.uniforms.amplitude = features.amplitude(&self.mapping);
            self.uniforms.offset_gain = features.offset_gain(self.offset_divisor);
            self.last_features = features;
        }

        if self.state.rotation_enabled {
            let step = |angle: f32| (angle + ROTATION_STEP_RAD) % TAU;
            self.rotation = Vec2::new(step(self.rotation.x), step(self.rotation.y));
        } else {
            self.rotation = Vec2::ZERO;
        }

        self.state.elapsed_time += TIME_STEP;
        self.uniforms.time = self.state.elapsed_time;

        presenter.present(&self.frame_view());
    }

    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            mesh: &self.mesh,
            mesh_generation: self.mesh_generation,
            uniforms: &self.uniforms,
            rotation: self.rotation,
            camera_distance: self.state.camera_distance,
        }
    }

    // === Accessors ===

    pub fn state(&self) -> &LiveState {
        &self.state
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn mesh(&self) -> &PointMesh {
        &self.mesh
    }

    pub fn mesh_generation(&self) -> u64 {
        self.mesh_generation
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn offset_divisor(&self) -> f32 {
        self.offset_divisor
    }

    pub fn table(&self) -> &PresetTable {
        &self.table
    }

    /// Band energies from the most recent active tick
    pub fn last_features(&self) -> AudioFeatures {
        self.last_features
    }

    /// One-line summary of the live parameters
    pub fn status_line(&self) -> String {
        let phase = match self.phase() {
            Phase::Initializing => "waiting for mic",
            Phase::Active => "live",
        };
        format!(
            "{} [{}/{}] | seg {} | size {:.2} | freq {:.2} | amp {:.2} | offset /{:.0} | cam {:.1} | rotate {} | {}",
            self.active_name,
            self.state.current_preset_index + 1,
            self.table.len(),
            self.state.segments,
            self.uniforms.size,
            self.uniforms.frequency,
            self.uniforms.amplitude,
            self.offset_divisor,
            self.state.camera_distance,
            if self.state.rotation_enabled { "on" } else { "off" },
            phase
        )
    }
}
