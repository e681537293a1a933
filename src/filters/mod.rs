//! Filter toggles and parameters
//!
//! The filter set is closed: every filter is a [`FilterKind`] variant, so
//! unknown filter names cannot exist at runtime. UI events that carry a
//! name go through [`FilterKind::parse`], which yields `None` for anything
//! unrecognized, and the event is dropped.

use serde::{Deserialize, Serialize};

pub mod color;
pub mod detect;
pub mod edges;
pub mod pipeline;
pub mod segment;
pub mod smooth;

pub use pipeline::{FrameReport, Pipeline};

/// The available filters, in pipeline application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    /// Desaturate to a single intensity, re-expanded to three channels
    Grayscale,
    /// Gaussian blur with a slider-controlled kernel
    Blur,
    /// Fixed 3x3 tone-matrix remix
    Sepia,
    /// Dual-threshold Canny edge extraction
    EdgeDetect,
    /// Face boxes with eye boxes nested inside them
    FaceDetect,
    /// Contour-based object counting with an on-frame count
    SegmentCount,
}

impl FilterKind {
    /// All filters in the order the pipeline applies them.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Grayscale,
        FilterKind::Blur,
        FilterKind::Sepia,
        FilterKind::EdgeDetect,
        FilterKind::FaceDetect,
        FilterKind::SegmentCount,
    ];

    /// Stable identifier used in settings and event relays.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Blur => "blur",
            FilterKind::Sepia => "sepia",
            FilterKind::EdgeDetect => "edge_detect",
            FilterKind::FaceDetect => "face_detect",
            FilterKind::SegmentCount => "segment_count",
        }
    }

    /// Display name for UI controls.
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Blur => "Blur",
            FilterKind::Sepia => "Sepia",
            FilterKind::EdgeDetect => "Edge detect",
            FilterKind::FaceDetect => "Face detect",
            FilterKind::SegmentCount => "Count objects",
        }
    }

    /// Look up a filter by its stable name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<FilterKind> {
        FilterKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    fn index(self) -> usize {
        FilterKind::ALL.iter().position(|&k| k == self).unwrap()
    }
}

/// Numeric parameters for the filters that need them.
///
/// These also serve as the persisted defaults in the settings file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Blur slider value `k`; the Gaussian kernel is `2k + 1` wide
    pub blur_radius: u32,
    /// Canny low threshold
    pub edge_low: f32,
    /// Canny high threshold
    pub edge_high: f32,
    /// Binarization level for object counting
    pub threshold: u8,
    /// Contours with area below this are discarded as noise
    pub min_area: f64,
    /// Contours with area above this are discarded
    pub max_area: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            blur_radius: 7,
            edge_low: 50.0,
            edge_high: 150.0,
            threshold: 128,
            min_area: 100.0,
            max_area: 500_000.0,
        }
    }
}

/// Enabled/disabled state for every filter plus their parameters.
///
/// Mutated only by UI event handlers; the pipeline reads it but never
/// writes it. Created with all filters disabled.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    enabled: [bool; FilterKind::ALL.len()],
    pub params: FilterParams,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterParams::default())
    }
}

impl FilterState {
    /// All filters disabled, with the given parameter defaults.
    pub fn new(params: FilterParams) -> Self {
        Self {
            enabled: [false; FilterKind::ALL.len()],
            params,
        }
    }

    pub fn is_enabled(&self, kind: FilterKind) -> bool {
        self.enabled[kind.index()]
    }

    pub fn set_enabled(&mut self, kind: FilterKind, enabled: bool) {
        self.enabled[kind.index()] = enabled;
    }

    /// Flip one toggle. Toggling twice restores the previous state.
    pub fn toggle(&mut self, kind: FilterKind) {
        let slot = &mut self.enabled[kind.index()];
        *slot = !*slot;
    }

    /// Relay entry point for events that carry a filter name. Unknown
    /// names change nothing and return `false`.
    pub fn toggle_by_name(&mut self, name: &str) -> bool {
        match FilterKind::parse(name) {
            Some(kind) => {
                self.toggle(kind);
                true
            }
            None => false,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled.iter().any(|&e| e)
    }

    /// Mutable access for UI checkboxes bound directly to a toggle.
    pub fn enabled_mut(&mut self, kind: FilterKind) -> &mut bool {
        &mut self.enabled[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_everything_disabled() {
        let state = FilterState::default();
        assert!(!state.any_enabled());
        for kind in FilterKind::ALL {
            assert!(!state.is_enabled(kind));
        }
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut state = FilterState::default();
        for kind in FilterKind::ALL {
            let before = state.clone();
            state.toggle(kind);
            assert!(state.is_enabled(kind));
            state.toggle(kind);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn toggles_are_independent() {
        let mut state = FilterState::default();
        state.toggle(FilterKind::Blur);
        state.toggle(FilterKind::Sepia);
        assert!(state.is_enabled(FilterKind::Blur));
        assert!(state.is_enabled(FilterKind::Sepia));
        assert!(!state.is_enabled(FilterKind::Grayscale));
        state.toggle(FilterKind::Blur);
        assert!(!state.is_enabled(FilterKind::Blur));
        assert!(state.is_enabled(FilterKind::Sepia));
    }

    #[test]
    fn set_enabled_is_absolute() {
        let mut state = FilterState::default();
        state.set_enabled(FilterKind::Sepia, true);
        assert!(state.is_enabled(FilterKind::Sepia));
        // Setting again is not a toggle.
        state.set_enabled(FilterKind::Sepia, true);
        assert!(state.is_enabled(FilterKind::Sepia));
        state.set_enabled(FilterKind::Sepia, false);
        assert!(!state.is_enabled(FilterKind::Sepia));
        assert!(!state.any_enabled());
    }

    #[test]
    fn unknown_names_are_a_no_op() {
        let mut state = FilterState::default();
        assert!(!state.toggle_by_name("swirl"));
        assert!(!state.any_enabled());
        assert!(state.toggle_by_name("blur"));
        assert!(state.is_enabled(FilterKind::Blur));
    }

    #[test]
    fn names_round_trip_and_unknowns_are_none() {
        for kind in FilterKind::ALL {
            assert_eq!(FilterKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(FilterKind::parse("posterize"), None);
        assert_eq!(FilterKind::parse(""), None);
    }
}
