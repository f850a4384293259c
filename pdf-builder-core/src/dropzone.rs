//! Dropzone overlay and dimension sync
//!
//! The dropzone is an invisible element stacked on top of the viewer. It must
//! always be exactly as large as the viewer's container, otherwise drops near
//! the bottom or right edge miss it and offsets are measured against the
//! wrong box.

use crate::geometry::Rect;
use std::fmt;

/// Height used when the viewer has not been measured yet
pub const FALLBACK_HEIGHT: CssLength = CssLength::Px(1000.0);
/// Width used when the viewer has not been measured yet
pub const FALLBACK_WIDTH: CssLength = CssLength::Percent(100.0);

/// Element reference name of the dropzone inside the viewer container
pub const DROPZONE_REF: &str = "iframeDropzone";

/// A CSS length as written to an inline style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Px(f64),
    Percent(f64),
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssLength::Px(value) => write!(f, "{value}px"),
            CssLength::Percent(value) => write!(f, "{value}%"),
        }
    }
}

/// The drop target stacked over the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct Dropzone {
    enabled: bool,
    height: CssLength,
    width: CssLength,
    listening: bool,
    mounted_in: Option<u64>,
}

impl Dropzone {
    pub fn new() -> Self {
        Self {
            enabled: false,
            height: FALLBACK_HEIGHT,
            width: FALLBACK_WIDTH,
            listening: false,
            mounted_in: None,
        }
    }

    /// Resize to the viewer's measured container
    ///
    /// Missing or zero measurements fall back to `1000px` by `100%`, one axis
    /// at a time.
    pub fn update_dimensions(&mut self, container: Option<Rect>) {
        self.height = container
            .map(|rect| rect.height)
            .filter(|height| *height > 0.0)
            .map(CssLength::Px)
            .unwrap_or(FALLBACK_HEIGHT);
        self.width = container
            .map(|rect| rect.width)
            .filter(|width| *width > 0.0)
            .map(CssLength::Px)
            .unwrap_or(FALLBACK_WIDTH);
    }

    /// Show the dropzone (the `enabled` class)
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Hide the dropzone
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn height(&self) -> CssLength {
        self.height
    }

    pub fn width(&self) -> CssLength {
        self.width
    }

    /// Install the dragover/drop listeners
    pub fn bind_events(&mut self) {
        self.listening = true;
    }

    /// Whether dragover/drop listeners are installed
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Generation of the viewer container currently holding the dropzone
    pub fn mounted_in(&self) -> Option<u64> {
        self.mounted_in
    }

    pub(crate) fn mount(&mut self, generation: u64) {
        self.mounted_in = Some(generation);
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted_in = None;
    }
}

impl Default for Dropzone {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_length_display() {
        assert_eq!(CssLength::Px(1000.0).to_string(), "1000px");
        assert_eq!(CssLength::Px(792.5).to_string(), "792.5px");
        assert_eq!(CssLength::Percent(100.0).to_string(), "100%");
    }

    #[test]
    fn test_new_dropzone_uses_fallbacks() {
        let dropzone = Dropzone::new();
        assert!(!dropzone.is_enabled());
        assert_eq!(dropzone.height().to_string(), "1000px");
        assert_eq!(dropzone.width().to_string(), "100%");
        assert_eq!(dropzone.mounted_in(), None);
    }

    #[test]
    fn test_update_dimensions_from_measurement() {
        let mut dropzone = Dropzone::new();
        dropzone.update_dimensions(Some(Rect::new(10.0, 10.0, 612.0, 1584.0)));
        assert_eq!(dropzone.height(), CssLength::Px(1584.0));
        assert_eq!(dropzone.width(), CssLength::Px(612.0));
    }

    #[test]
    fn test_update_dimensions_without_measurement() {
        let mut dropzone = Dropzone::new();
        dropzone.update_dimensions(Some(Rect::from_size(612.0, 792.0)));
        dropzone.update_dimensions(None);
        assert_eq!(dropzone.height(), FALLBACK_HEIGHT);
        assert_eq!(dropzone.width(), FALLBACK_WIDTH);
    }

    #[test]
    fn test_update_dimensions_zero_axis_falls_back_alone() {
        let mut dropzone = Dropzone::new();
        dropzone.update_dimensions(Some(Rect::from_size(640.0, 0.0)));
        assert_eq!(dropzone.height(), FALLBACK_HEIGHT);
        assert_eq!(dropzone.width(), CssLength::Px(640.0));
    }

    #[test]
    fn test_enable_disable() {
        let mut dropzone = Dropzone::new();
        dropzone.enable();
        assert!(dropzone.is_enabled());
        dropzone.disable();
        assert!(!dropzone.is_enabled());
    }
}
