//! Color-sampled UI elements
//!
//! A button is considered visible when the average color of its area is
//! close to the color recorded for it. Areas are in 1280x720 reference
//! pixels.

use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::UiElement;
use crate::config::ConfigError;
use crate::vision::{average_color, color_similar, Region};

/// A UI element recognized by color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    /// Area that is sampled
    pub area: Region,
    /// Average color of the area while the element shows
    pub color: [u8; 3],
    /// Area that receives the tap
    pub click_area: Region,
}

impl Button {
    pub fn new(area: Region, color: [u8; 3], click_area: Region) -> Self {
        Self {
            area,
            color,
            click_area,
        }
    }

    /// Check if the button shows on a frame
    pub fn appear_on(&self, frame: &RgbaImage, tolerance: u8) -> bool {
        match average_color(frame, self.area) {
            Ok(sampled) => color_similar(sampled, self.color.map(f32::from), tolerance),
            Err(e) => {
                log::warn!("Cannot sample button area: {}", e);
                false
            }
        }
    }

    /// Reference coordinates of the tap
    pub fn click_point(&self) -> (i32, i32) {
        let (x, y) = self.click_area.center();
        (x as i32, y as i32)
    }
}

/// Every element the handlers use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonSet {
    pub ambush_evade: Button,
    pub ambush_attack: Button,
    pub info_bar: Button,
}

impl Default for ButtonSet {
    fn default() -> Self {
        Self {
            ambush_evade: Button::new(
                Region::new(1004, 514, 170, 44),
                [239, 186, 82],
                Region::new(990, 500, 200, 72),
            ),
            ambush_attack: Button::new(
                Region::new(1004, 428, 170, 44),
                [82, 130, 214],
                Region::new(990, 414, 200, 72),
            ),
            info_bar: Button::new(
                Region::new(458, 88, 8, 8),
                [107, 226, 255],
                Region::new(475, 78, 330, 36),
            ),
        }
    }
}

impl ButtonSet {
    /// Load a button set from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn get(&self, element: UiElement) -> &Button {
        match element {
            UiElement::AmbushEvade => &self.ambush_evade,
            UiElement::AmbushAttack => &self.ambush_attack,
            UiElement::InfoBar => &self.info_bar,
        }
    }
}
