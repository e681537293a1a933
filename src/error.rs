//! Error types for capture, processing assets, and snapshot output.

use std::path::PathBuf;

/// Errors surfaced to the user while the app keeps running.
///
/// None of these are fatal: a failed camera open leaves capture off until
/// the next start request, a missed frame skips one tick, and a failed
/// save leaves the live feed untouched.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The camera failed to open. Capture stays disabled until the user
    /// requests start again; no retries are attempted.
    #[error("camera {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    /// No processed frame exists yet, e.g. a save requested before the
    /// first capture arrives.
    #[error("no frame available")]
    FrameUnavailable,

    /// Writing the snapshot failed.
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A runtime asset (face detection model, overlay font) could not be
    /// loaded. The filter that needs it is reported unavailable.
    #[error("failed to load {what} from {path}: {reason}")]
    AssetLoad {
        what: &'static str,
        path: PathBuf,
        reason: String,
    },
}
