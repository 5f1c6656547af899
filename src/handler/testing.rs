//! Scripted collaborators for handler tests

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use image::{ImageBuffer, Rgba, RgbaImage};

use super::{Combat, ExpectedEnd, HandlerError};
use crate::config::settings::RegionSettings;
use crate::config::{AmbushMode, Settings};
use crate::device::{Device, DeviceError, UiElement};
use crate::vision::Region;

pub(crate) const MAP: [u8; 3] = [74, 99, 115];
const OVERLAY: Rgba<u8> = Rgba([190, 60, 60, 255]);
const BAR: Rgba<u8> = Rgba([0, 0, 0, 255]);

const AMBUSH: Region = Region::new(0, 0, 8, 8);
const AIR_RAID: Region = Region::new(56, 0, 8, 8);
const INFO_BAR: Region = Region::new(8, 12, 40, 16);

/// Settings laid out for 64x32 test frames, with no waiting windows
pub(crate) fn settings(mode: AmbushMode) -> Settings {
    let mut settings = Settings::evade_preset();
    settings.map.ambush_mode = mode;
    settings.regions = RegionSettings {
        ambush: AMBUSH,
        air_raid: AIR_RAID,
        info_bar: INFO_BAR,
        ambush_reference: MAP,
        air_raid_reference: MAP,
    };
    settings.detection.air_raid_confirm_ms = 0;
    settings.timings.info_bar_timeout_ms = 0;
    settings
}

/// What one captured frame shows
#[derive(Clone, Default)]
pub(crate) struct Screen {
    ambush: bool,
    air_raid: bool,
    glyph: Option<RgbaImage>,
    visible: Vec<UiElement>,
    at: Duration,
}

impl Screen {
    /// Plain map
    pub(crate) fn map() -> Self {
        Self::default()
    }

    pub(crate) fn ambush(mut self) -> Self {
        self.ambush = true;
        self
    }

    pub(crate) fn air_raid(mut self) -> Self {
        self.air_raid = true;
        self
    }

    pub(crate) fn showing(mut self, element: UiElement) -> Self {
        self.visible.push(element);
        self
    }

    /// Captured `ms` milliseconds after the first frame
    pub(crate) fn at(mut self, ms: u64) -> Self {
        self.at = Duration::from_millis(ms);
        self
    }

    /// Info bar carrying a glyph
    pub(crate) fn info_bar(mut self, glyph: RgbaImage) -> Self {
        self.glyph = Some(glyph);
        self.showing(UiElement::InfoBar)
    }

    fn render(&self) -> RgbaImage {
        let map = Rgba([MAP[0], MAP[1], MAP[2], 255]);
        let mut frame: RgbaImage = ImageBuffer::from_fn(64, 32, |x, y| {
            let inside = |r: Region| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height;
            if (self.ambush && inside(AMBUSH)) || (self.air_raid && inside(AIR_RAID)) {
                OVERLAY
            } else if self.glyph.is_some() && inside(INFO_BAR) {
                BAR
            } else {
                map
            }
        });
        if let Some(glyph) = &self.glyph {
            image::imageops::overlay(&mut frame, glyph, 20, 16);
        }
        frame
    }
}

/// Device that steps through a fixed list of screens
///
/// Frame 0 is current from the start; every screenshot moves one frame on
/// and capturing past the last frame fails. The clock reads the capture
/// time scripted for the current frame, zero unless set with [`Screen::at`].
pub(crate) struct ScriptedDevice {
    frames: Vec<(RgbaImage, Vec<UiElement>, Duration)>,
    cursor: usize,
    start: Instant,
    pub screenshots: usize,
    pub clicks: Vec<UiElement>,
}

impl ScriptedDevice {
    pub(crate) fn new(screens: Vec<Screen>) -> Self {
        assert!(!screens.is_empty());
        Self {
            frames: screens
                .into_iter()
                .map(|screen| (screen.render(), screen.visible, screen.at))
                .collect(),
            cursor: 0,
            start: Instant::now(),
            screenshots: 0,
            clicks: Vec::new(),
        }
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clock reading at `ms` into the script
    pub(crate) fn time(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }
}

impl Device for ScriptedDevice {
    fn screenshot(&mut self) -> Result<&RgbaImage, DeviceError> {
        if self.cursor + 1 >= self.frames.len() {
            return Err(DeviceError::Exhausted);
        }
        self.cursor += 1;
        self.screenshots += 1;
        Ok(&self.frames[self.cursor].0)
    }

    fn image(&self) -> &RgbaImage {
        &self.frames[self.cursor].0
    }

    fn is_visible(&self, element: UiElement) -> bool {
        self.frames[self.cursor].1.contains(&element)
    }

    fn now(&self) -> Instant {
        self.start + self.frames[self.cursor].2
    }

    fn click(&mut self, element: UiElement) -> Result<(), DeviceError> {
        self.clicks.push(element);
        Ok(())
    }
}

/// Combat double answering from queues and recording every call
#[derive(Default)]
pub(crate) struct RecordingCombat {
    pub combat_screens: VecDeque<bool>,
    pub low_emotion: VecDeque<bool>,
    pub retirement: VecDeque<bool>,
    pub engaged: Vec<ExpectedEnd>,
    pub low_emotion_handled: usize,
    pub retirement_handled: usize,
}

impl Combat for RecordingCombat {
    fn combat_appear(&mut self, _device: &mut dyn Device) -> bool {
        self.combat_screens.pop_front().unwrap_or(false)
    }

    fn handle_low_emotion(&mut self, _device: &mut dyn Device) -> Result<bool, HandlerError> {
        let handled = self.low_emotion.pop_front().unwrap_or(false);
        if handled {
            self.low_emotion_handled += 1;
        }
        Ok(handled)
    }

    fn handle_retirement(&mut self, _device: &mut dyn Device) -> Result<bool, HandlerError> {
        let handled = self.retirement.pop_front().unwrap_or(false);
        if handled {
            self.retirement_handled += 1;
        }
        Ok(handled)
    }

    fn engage(&mut self, _device: &mut dyn Device, expected_end: ExpectedEnd) -> Result<(), HandlerError> {
        self.engaged.push(expected_end);
        Ok(())
    }
}
