//! Vibebox library - Audio-reactive point-cloud box visualizer

pub mod audio;
pub mod camera;
pub mod cli;
pub mod controller;
pub mod mesh;
pub mod panel;
pub mod params;
pub mod presets;
pub mod rendering;
pub mod schedule;
