//! Overlay transparency detection
//!
//! Ambushes and air raids wash the map with a semi-transparent red layer.
//! Comparing the red channel of a sampled area against the map color
//! underneath gives an estimate of how opaque that layer currently is.

use image::RgbaImage;

use super::capture::average_color;
use super::{Region, VisionError};

/// Transparency of a red overlay between a reference color and a sampled color
///
/// Returns 0.0 when the sample matches the reference and 1.0 when its red
/// channel reaches `red`, the red of a fully opaque overlay. The result is
/// clamped to `[0, 1]`.
pub fn red_overlay_transparency(reference: [f32; 3], sampled: [f32; 3], red: u8) -> f32 {
    let span = red as f32 - reference[0];
    if span <= 0.0 {
        return 0.0;
    }

    ((sampled[0] - reference[0]) / span).clamp(0.0, 1.0)
}

/// Detects one kind of full-screen overlay
#[derive(Debug, Clone)]
pub struct OverlayDetector {
    name: &'static str,
    region: Region,
    reference: [f32; 3],
    threshold: f32,
    red: u8,
}

impl OverlayDetector {
    /// Create a detector sampling `region` against a fixed reference color
    pub fn new(name: &'static str, region: Region, reference: [u8; 3], threshold: f32, red: u8) -> Self {
        Self {
            name,
            region,
            reference: reference.map(f32::from),
            threshold,
            red,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn reference(&self) -> [f32; 3] {
        self.reference
    }

    /// Sample the region of a clean frame and use it as the reference color
    pub fn load_reference(&mut self, frame: &RgbaImage) -> Result<(), VisionError> {
        self.reference = average_color(frame, self.region)?;
        log::debug!("{} reference color: {:?}", self.name, self.reference);
        Ok(())
    }

    /// Overlay transparency score of a frame
    pub fn score(&self, frame: &RgbaImage) -> Result<f32, VisionError> {
        let sampled = average_color(frame, self.region)?;
        Ok(red_overlay_transparency(self.reference, sampled, self.red))
    }

    /// Whether a score means the overlay is present (strictly above threshold)
    pub fn exceeds(&self, score: f32) -> bool {
        score > self.threshold
    }

    /// Whether the overlay is present on a frame
    pub fn is_present(&self, frame: &RgbaImage) -> Result<bool, VisionError> {
        let score = self.score(frame)?;
        log::debug!("{} overlay: {:.3} (threshold {:.2})", self.name, score, self.threshold);
        Ok(self.exceeds(score))
    }
}
