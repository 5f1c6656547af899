//! Vision and image processing module
//!
//! Handles color sampling of screenshots, overlay transparency detection
//! and info bar letter recognition.

pub mod capture;
pub mod glyph;
pub mod overlay;

use serde::{Deserialize, Serialize};

pub use capture::{average_color, color_similar, crop};
pub use glyph::{GlyphClassifier, GlyphLabel, GlyphSet, TemplateSet};
pub use overlay::{red_overlay_transparency, OverlayDetector};

/// A rectangle in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the region lies inside a frame of the given size
    pub fn fits(&self, frame_width: u32, frame_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.saturating_add(self.width) <= frame_width
            && self.y.saturating_add(self.height) <= frame_height
    }

    /// Center point of the region
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Region {region:?} is outside the {width}x{height} frame")]
    RegionOutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("Failed to load template {name}: {source}")]
    TemplateLoad {
        name: String,
        #[source]
        source: image::ImageError,
    },
}
