//! Keyboard parameter panel: key bindings mapped onto controller mutators.

use std::time::Instant;
use winit::keyboard::KeyCode;

use crate::controller::VisualizationController;
use crate::schedule::AutoCycle;

const CAMERA_STEP: f32 = 0.5;
const FREQUENCY_STEP: f32 = 0.1;
const AMPLITUDE_STEP: f32 = 0.1;
const POINT_SIZE_STEP: f32 = 0.25;
const OFFSET_DIVISOR_STEP: f32 = 5.0;

/// Which segment count an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
    Depth,
}

/// A single panel edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    ToggleRotation,
    NextPreset,
    RandomPreset,
    /// Zero-based preset index
    SelectPreset(usize),
    Segments(Axis, i64),
    CameraDistance(f32),
    Frequency(f32),
    Amplitude(f32),
    PointSize(f32),
    OffsetDivisor(f32),
    ToggleAutoCycle,
    Quit,
}

/// Key binding for a physical key, if any
pub fn action_for(key: KeyCode) -> Option<PanelAction> {
    use PanelAction::*;

    let action = match key {
        KeyCode::KeyR => ToggleRotation,
        KeyCode::Space | KeyCode::ArrowRight => NextPreset,
        KeyCode::KeyN => RandomPreset,
        KeyCode::Digit1 => SelectPreset(0),
        KeyCode::Digit2 => SelectPreset(1),
        KeyCode::Digit3 => SelectPreset(2),
        KeyCode::Digit4 => SelectPreset(3),
        KeyCode::Digit5 => SelectPreset(4),
        KeyCode::Digit6 => SelectPreset(5),
        KeyCode::Digit7 => SelectPreset(6),
        KeyCode::Digit8 => SelectPreset(7),
        KeyCode::Digit9 => SelectPreset(8),
        KeyCode::KeyQ => Segments(Axis::Width, 1),
        KeyCode::KeyA => Segments(Axis::Width, -1),
        KeyCode::KeyW => Segments(Axis::Height, 1),
        KeyCode::KeyS => Segments(Axis::Height, -1),
        KeyCode::KeyE => Segments(Axis::Depth, 1),
        KeyCode::KeyD => Segments(Axis::Depth, -1),
        // Up moves the camera closer
        KeyCode::ArrowUp => CameraDistance(-CAMERA_STEP),
        KeyCode::ArrowDown => CameraDistance(CAMERA_STEP),
        KeyCode::KeyF => Frequency(FREQUENCY_STEP),
        KeyCode::KeyV => Frequency(-FREQUENCY_STEP),
        KeyCode::KeyG => Amplitude(AMPLITUDE_STEP),
        KeyCode::KeyB => Amplitude(-AMPLITUDE_STEP),
        KeyCode::Equal => PointSize(POINT_SIZE_STEP),
        KeyCode::Minus => PointSize(-POINT_SIZE_STEP),
        KeyCode::BracketRight => OffsetDivisor(OFFSET_DIVISOR_STEP),
        KeyCode::BracketLeft => OffsetDivisor(-OFFSET_DIVISOR_STEP),
        KeyCode::KeyC => ToggleAutoCycle,
        KeyCode::Escape => Quit,
        _ => return None,
    };
    Some(action)
}

/// Apply an edit through the controller's validated mutators
///
/// `Quit` is left to the event loop and does nothing here.
pub fn apply(
    action: PanelAction,
    controller: &mut VisualizationController,
    auto_cycle: &mut AutoCycle,
    now: Instant,
) {
    match action {
        PanelAction::ToggleRotation => {
            let enabled = !controller.state().rotation_enabled;
            controller.set_rotation(enabled);
        }
        PanelAction::NextPreset => controller.advance_preset(),
        PanelAction::RandomPreset => controller.activate_random_preset(),
        PanelAction::SelectPreset(index) => {
            if index < controller.table().len() {
                controller.activate_preset(index);
            } else {
                log::debug!("No preset {} (table has {})", index + 1, controller.table().len());
            }
        }
        PanelAction::Segments(axis, delta) => {
            let s = controller.state().segments;
            let (mut w, mut h, mut d) = (s.width as i64, s.height as i64, s.depth as i64);
            match axis {
                Axis::Width => w += delta,
                Axis::Height => h += delta,
                Axis::Depth => d += delta,
            }
            controller.set_segments(w, h, d);
        }
        PanelAction::CameraDistance(delta) => {
            let distance = controller.state().camera_distance + delta;
            controller.set_camera_distance(distance);
        }
        PanelAction::Frequency(delta) => {
            let frequency = controller.uniforms().frequency + delta;
            controller.set_frequency(frequency);
        }
        PanelAction::Amplitude(delta) => {
            let amplitude = controller.uniforms().amplitude + delta;
            controller.set_amplitude(amplitude);
        }
        PanelAction::PointSize(delta) => {
            let size = controller.uniforms().size + delta;
            controller.set_point_size(size);
        }
        PanelAction::OffsetDivisor(delta) => {
            let divisor = controller.offset_divisor() + delta;
            controller.set_offset_divisor(divisor);
        }
        PanelAction::ToggleAutoCycle => {
            let enabled = !auto_cycle.is_enabled();
            auto_cycle.set_enabled(enabled, now);
            log::info!(
                "Auto-cycle {} ({:?} every {:.1}s)",
                if enabled { "on" } else { "off" },
                auto_cycle.mode(),
                auto_cycle.interval().as_secs_f32()
            );
        }
        PanelAction::Quit => {}
    }
}
