//! Microphone capture with background frequency analysis.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::analyser::FrequencyAnalyser;
use super::FrequencySource;
use crate::params::AnalyserConfig;

/// Reasons microphone capture could not be started
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("microphone access was denied")]
    PermissionDenied,
    #[error("no usable input device: {0}")]
    DeviceUnavailable(String),
    #[error("audio input stream failed: {0}")]
    Stream(String),
    #[error("invalid analyser config: {0}")]
    InvalidConfig(String),
}

/// Capture request that resolves at most once
pub struct PendingCapture {
    receiver: Receiver<Result<AnalyserHandle, CaptureError>>,
    resolved: bool,
}

impl PendingCapture {
    pub(crate) fn new(receiver: Receiver<Result<AnalyserHandle, CaptureError>>) -> Self {
        Self {
            receiver,
            resolved: false,
        }
    }

    /// Non-blocking check for the capture outcome
    ///
    /// Returns `Some` exactly once; `None` while pending and after resolution.
    pub fn poll(&mut self) -> Option<Result<AnalyserHandle, CaptureError>> {
        if self.resolved {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.resolved = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.resolved = true;
                Some(Err(CaptureError::Stream(
                    "capture thread exited before reporting".to_string(),
                )))
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Handle to a running capture; reads the latest analysed energies
pub struct AnalyserHandle {
    /// Shared analyser output (written by the capture thread)
    energies: Arc<Mutex<Vec<u8>>>,

    /// Copy handed out by `read_energies`
    scratch: Vec<u8>,

    device_name: String,
}

impl AnalyserHandle {
    pub(crate) fn new(energies: Arc<Mutex<Vec<u8>>>, device_name: String) -> Self {
        Self {
            energies,
            scratch: Vec::new(),
            device_name,
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl FrequencySource for AnalyserHandle {
    fn read_energies(&mut self) -> &[u8] {
        let energies = lock_or_recover(&self.energies);
        self.scratch.clear();
        self.scratch.extend_from_slice(&energies);
        &self.scratch
    }
}

/// Lock `mutex`, taking the data back if a panicking thread poisoned it
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Fixed-capacity buffer holding the newest mono samples
struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.samples.iter().copied());
    }
}

/// Start microphone capture on a background thread
///
/// Never blocks: the returned request is polled each frame. Once the stream
/// is running the thread keeps it alive for the process lifetime and
/// refreshes the energies every `update_interval_ms`.
pub fn request_capture(config: AnalyserConfig) -> PendingCapture {
    let (sender, receiver) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("audio-capture".to_string())
        .spawn(move || run_capture(config, sender));

    // On spawn failure the sender is dropped and `poll` reports it
    if let Err(e) = spawned {
        log::error!("Failed to spawn audio capture thread: {}", e);
    }

    PendingCapture::new(receiver)
}

fn run_capture(config: AnalyserConfig, sender: Sender<Result<AnalyserHandle, CaptureError>>) {
    let mut analyser = match FrequencyAnalyser::new(config.clone()) {
        Ok(analyser) => analyser,
        Err(e) => {
            let _ = sender.send(Err(CaptureError::InvalidConfig(e)));
            return;
        }
    };

    let ring = Arc::new(Mutex::new(SampleRing::new(config.fft_size)));

    // Stream must stay on this thread (not Send on every platform)
    let (_stream, device_name) = match open_input_stream(Arc::clone(&ring)) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = sender.send(Err(e));
            return;
        }
    };

    let energies = Arc::new(Mutex::new(vec![0u8; analyser.bin_count()]));
    let handle = AnalyserHandle::new(Arc::clone(&energies), device_name);
    if sender.send(Ok(handle)).is_err() {
        return;
    }

    let mut samples = Vec::with_capacity(config.fft_size);
    let mut bytes = Vec::with_capacity(analyser.bin_count());

    loop {
        thread::sleep(Duration::from_millis(config.update_interval_ms));

        lock_or_recover(&ring).copy_into(&mut samples);
        analyser.analyse(&samples, &mut bytes);
        lock_or_recover(&energies).clone_from(&bytes);
    }
}

/// Open the default input device and start streaming mono samples into `ring`
fn open_input_stream(
    ring: Arc<Mutex<SampleRing>>,
) -> Result<(cpal::Stream, String), CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".to_string()))?;

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let supported = device.default_input_config().map_err(|e| match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => {
            CaptureError::DeviceUnavailable(device_name.clone())
        }
        cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
            CaptureError::DeviceUnavailable(format!("{} does not support input", device_name))
        }
        cpal::DefaultStreamConfigError::BackendSpecific { err } => {
            classify_backend_error(&err.description)
        }
    })?;

    log::info!(
        "Audio input: {} @ {}Hz, {} channel(s), {:?}",
        device_name,
        supported.sample_rate().0,
        supported.channels(),
        supported.sample_format()
    );

    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, ring)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, ring)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, ring)?,
        SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, ring)?,
        other => {
            return Err(CaptureError::DeviceUnavailable(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    };

    stream.play().map_err(|e| match e {
        cpal::PlayStreamError::DeviceNotAvailable => {
            CaptureError::DeviceUnavailable(device_name.clone())
        }
        cpal::PlayStreamError::BackendSpecific { err } => classify_backend_error(&err.description),
    })?;

    Ok((stream, device_name))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut buffer = lock_or_recover(&ring);
                // Downmix interleaved frames to mono
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
                    buffer.push(sum / frame.len() as f32);
                }
            },
            |err| log::error!("Audio input stream error: {}", err),
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("input device disappeared".to_string())
            }
            cpal::BuildStreamError::BackendSpecific { err } => {
                classify_backend_error(&err.description)
            }
            other => CaptureError::Stream(other.to_string()),
        })
}

/// Map a backend error description onto the capture taxonomy
fn classify_backend_error(description: &str) -> CaptureError {
    let lower = description.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        CaptureError::PermissionDenied
    } else {
        CaptureError::DeviceUnavailable(description.to_string())
    }
}
