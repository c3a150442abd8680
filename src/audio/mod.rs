//! Microphone capture and frequency analysis.
//!
//! Capture runs on a background thread and resolves once; the render loop
//! polls for the outcome and then reads byte-scaled bin energies every frame.

mod analyser;
mod capture;

// Re-export public types
pub use analyser::FrequencyAnalyser;
pub use capture::{request_capture, AnalyserHandle, CaptureError, PendingCapture};

/// Source of per-bin frequency energies (0-255)
pub trait FrequencySource {
    /// Latest energies, one byte per frequency bin
    fn read_energies(&mut self) -> &[u8];
}
