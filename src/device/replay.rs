//! Screenshot replay
//!
//! Plays back a directory of PNG screenshots as if they came from a live
//! device. Taps are recorded instead of sent anywhere, and the device
//! fails with [`DeviceError::Exhausted`] once the last frame is used up,
//! which also ends any wait that is still polling.
//!
//! Frames decode much faster than they were recorded, so the device keeps
//! its own clock that advances one frame interval per screenshot.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::RgbaImage;

use super::input::{REF_HEIGHT, REF_WIDTH};
use super::{ButtonSet, Device, DeviceError, ScreenCoordinates, Tap, UiElement};

/// Capture spacing assumed when none is given
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(200);

/// Device backed by screenshots on disk
pub struct ReplayDevice {
    frames: Vec<PathBuf>,
    cursor: usize,
    image: RgbaImage,
    coords: ScreenCoordinates,
    buttons: ButtonSet,
    tolerance: u8,
    taps: Vec<Tap>,
    start: Instant,
    frame_interval: Duration,
}

impl ReplayDevice {
    /// Open every `.png` in a directory, replayed in file name order
    pub fn open(
        dir: impl AsRef<Path>,
        buttons: ButtonSet,
        tolerance: u8,
    ) -> Result<Self, DeviceError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| DeviceError::CaptureFailed(format!("{}: {}", dir.display(), e)))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        frames.sort();

        log::info!("Replaying {} frames from {}", frames.len(), dir.display());
        Ok(Self::with_frames(frames, buttons, tolerance))
    }

    /// Replay an explicit list of screenshot files
    pub fn with_frames(frames: Vec<PathBuf>, buttons: ButtonSet, tolerance: u8) -> Self {
        Self {
            frames,
            cursor: 0,
            image: RgbaImage::new(REF_WIDTH, REF_HEIGHT),
            coords: ScreenCoordinates::default(),
            buttons,
            tolerance,
            taps: Vec::new(),
            start: Instant::now(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Time between two recorded frames
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Taps issued so far
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Frames not yet captured
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl Device for ReplayDevice {
    fn screenshot(&mut self) -> Result<&RgbaImage, DeviceError> {
        let Some(path) = self.frames.get(self.cursor) else {
            return Err(DeviceError::Exhausted);
        };
        self.cursor += 1;

        let frame = image::open(path)
            .map_err(|e| DeviceError::CaptureFailed(format!("{}: {}", path.display(), e)))?
            .to_rgba8();

        // Detection works in reference pixels, taps go out in device pixels
        self.coords = ScreenCoordinates::new(frame.width(), frame.height());
        self.image = if self.coords.is_reference() {
            frame
        } else {
            image::imageops::resize(
                &frame,
                REF_WIDTH,
                REF_HEIGHT,
                image::imageops::FilterType::Triangle,
            )
        };

        log::trace!("Frame {}: {}", self.cursor, path.display());
        Ok(&self.image)
    }

    fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn now(&self) -> Instant {
        let frames = u32::try_from(self.cursor).unwrap_or(u32::MAX);
        self.start + self.frame_interval * frames
    }

    fn is_visible(&self, element: UiElement) -> bool {
        self.buttons.get(element).appear_on(&self.image, self.tolerance)
    }

    fn click(&mut self, element: UiElement) -> Result<(), DeviceError> {
        let tap = self.coords.tap(element, self.buttons.get(element));
        log::info!("Click {:?} at ({}, {})", tap.element, tap.x, tap.y);
        self.taps.push(tap);
        Ok(())
    }
}
