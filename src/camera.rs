//! Camera capture
//!
//! Cross-platform capture via nokhwa. The device is opened on a
//! background thread (nokhwa cameras are created where they are used);
//! decoded RGBA frames are published into a single latest-frame slot the
//! UI thread polls once per tick. A status cell reports whether the open
//! succeeded so a failed device surfaces as `DeviceUnavailable` without
//! blocking the UI.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use parking_lot::Mutex;

/// One captured frame plus its capture sequence number.
#[derive(Clone)]
pub struct CapturedFrame {
    pub image: RgbaImage,
    pub frame_number: u64,
}

/// Where the capture thread is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Device open in progress
    Opening,
    /// Device open, frames flowing
    Running,
    /// Device open failed; the session should be dropped
    Failed(String),
}

/// Information about an available camera.
#[derive(Clone, Debug)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
}

impl CameraInfo {
    /// The label the device picker shows for this camera.
    pub fn device_label(&self) -> String {
        format!("{}: {}", self.index, self.name)
    }
}

/// An open capture session. Dropping it (or calling [`stop`]) releases
/// the device exactly once.
///
/// [`stop`]: CameraSession::stop
pub struct CameraSession {
    latest: Arc<Mutex<Option<CapturedFrame>>>,
    status: Arc<Mutex<CaptureStatus>>,
    running: Arc<AtomicBool>,
    frame_count: Arc<AtomicU64>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    last_seen: u64,
}

impl CameraSession {
    /// Enumerate attached cameras for the UI.
    pub fn list_cameras() -> Vec<CameraInfo> {
        match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
            Ok(list) => list
                .iter()
                .enumerate()
                .map(|(idx, info)| CameraInfo {
                    index: idx as u32,
                    name: info.human_name().to_string(),
                })
                .collect(),
            Err(e) => {
                log::warn!("Failed to enumerate cameras: {:?}", e);
                Vec::new()
            }
        }
    }

    /// Start a capture session for the given device index.
    ///
    /// Returns immediately; poll [`status`] to learn whether the open
    /// succeeded. Open failures are reported once and never retried.
    ///
    /// [`status`]: CameraSession::status
    pub fn open(camera_index: u32) -> Result<Self, String> {
        let latest: Arc<Mutex<Option<CapturedFrame>>> = Arc::new(Mutex::new(None));
        let status = Arc::new(Mutex::new(CaptureStatus::Opening));
        let running = Arc::new(AtomicBool::new(true));
        let frame_count = Arc::new(AtomicU64::new(0));

        let latest_clone = latest.clone();
        let status_clone = status.clone();
        let running_clone = running.clone();
        let frame_count_clone = frame_count.clone();

        let thread_handle = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_thread(
                    camera_index,
                    latest_clone,
                    status_clone,
                    running_clone,
                    frame_count_clone,
                );
            })
            .map_err(|e| format!("Failed to spawn capture thread: {}", e))?;

        Ok(Self {
            latest,
            status,
            running,
            frame_count,
            thread_handle: Some(thread_handle),
            last_seen: 0,
        })
    }

    fn capture_thread(
        camera_index: u32,
        latest: Arc<Mutex<Option<CapturedFrame>>>,
        status: Arc<Mutex<CaptureStatus>>,
        running: Arc<AtomicBool>,
        frame_count: Arc<AtomicU64>,
    ) {
        log::info!("Starting camera capture thread (camera {})", camera_index);

        let index = CameraIndex::Index(camera_index);
        let requested =
            RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = match Camera::new(index.clone(), requested) {
            Ok(c) => c,
            Err(e) => {
                // One fallback: let the backend pick any format it can.
                let any = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
                match Camera::new(index, any) {
                    Ok(c) => c,
                    Err(e2) => {
                        log::error!("Failed to open camera: {:?} / {:?}", e, e2);
                        *status.lock() = CaptureStatus::Failed(e2.to_string());
                        return;
                    }
                }
            }
        };

        if let Err(e) = camera.open_stream() {
            log::error!("Failed to open camera stream: {:?}", e);
            *status.lock() = CaptureStatus::Failed(e.to_string());
            return;
        }

        log::info!(
            "Camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );
        *status.lock() = CaptureStatus::Running;

        while running.load(Ordering::Acquire) {
            match camera.frame() {
                Ok(frame) => match frame.decode_image::<RgbAFormat>() {
                    Ok(decoded) => {
                        // Rebuild from raw bytes so the buffer type is
                        // ours regardless of nokhwa's image version.
                        let width = frame.resolution().width();
                        let height = frame.resolution().height();
                        match RgbaImage::from_raw(width, height, decoded.into_raw()) {
                            Some(image) => {
                                let frame_number =
                                    frame_count.fetch_add(1, Ordering::Relaxed) + 1;
                                *latest.lock() = Some(CapturedFrame { image, frame_number });
                            }
                            None => {
                                log::warn!("Decoded frame size mismatch, dropping");
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to decode frame: {:?}", e);
                    }
                },
                Err(e) => {
                    // A single missed read is skipped; the loop continues.
                    log::warn!("Failed to capture frame: {:?}", e);
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            }
        }

        log::info!("Camera capture thread stopped");
    }

    /// Current lifecycle status.
    pub fn status(&self) -> CaptureStatus {
        self.status.lock().clone()
    }

    /// The latest frame, if it is newer than the one previously returned.
    /// `None` means no new frame this tick and the caller skips processing.
    pub fn poll_frame(&mut self) -> Option<CapturedFrame> {
        let frame = self.latest.lock().clone()?;
        if frame.frame_number <= self.last_seen {
            return None;
        }
        self.last_seen = frame.frame_number;
        Some(frame)
    }

    /// Total frames captured so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    /// Stop capturing and release the device. Idempotent; also invoked
    /// by `Drop`.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_label_pairs_index_with_name() {
        let info = CameraInfo {
            index: 1,
            name: "Integrated Webcam".to_string(),
        };
        assert_eq!(info.device_label(), "1: Integrated Webcam");
    }

    #[test]
    fn enumeration_never_panics() {
        // A machine with no cameras (or no backend) yields an empty list.
        let _cameras = CameraSession::list_cameras();
    }
}
