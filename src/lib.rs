//! Camera Filters - webcam viewer with toggleable image filters
//!
//! Captures camera input, applies the enabled subset of a fixed filter
//! pipeline (grayscale, Gaussian blur, sepia, Canny edges, face boxes,
//! contour-based object counting), and displays the result. The most
//! recent processed frame can be saved to disk on demand.

pub mod app;
pub mod camera;
pub mod error;
pub mod filters;
pub mod settings;

pub use app::App;
