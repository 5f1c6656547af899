//! Device module
//!
//! The screenshot and input seam. Handlers only ever talk to the screen
//! through the [`Device`] trait; blocking waits are provided on top of the
//! three primitives every device implements.
//!
//! None of the unbounded waits time out. A device that can never show the
//! awaited element must fail its `screenshot` call, or the caller has to
//! wrap the handler in its own watchdog.

pub mod button;
pub mod input;
pub mod replay;

use std::time::{Duration, Instant};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

pub use button::{Button, ButtonSet};
pub use input::{ClickIntervals, ScreenCoordinates, Tap};
pub use replay::ReplayDevice;

/// On-screen elements the handlers look for or press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiElement {
    /// "Evade" button of the ambush prompt
    AmbushEvade,
    /// "Attack" button of the ambush prompt
    AmbushAttack,
    /// Info bar banner at the top of the map
    InfoBar,
}

/// Screen capture and input
pub trait Device {
    /// Capture a fresh screenshot and make it the current frame
    fn screenshot(&mut self) -> Result<&RgbaImage, DeviceError>;

    /// The most recently captured frame
    fn image(&self) -> &RgbaImage;

    /// Whether an element shows on the current frame
    fn is_visible(&self, element: UiElement) -> bool;

    /// Press an element
    fn click(&mut self, element: UiElement) -> Result<(), DeviceError>;

    /// Time of the current frame
    ///
    /// Live devices capture in real time. Replays report the time the frame
    /// was recorded at, so confirmation windows and click intervals follow
    /// the recording and not the replay speed.
    fn now(&self) -> Instant {
        Instant::now()
    }

    /// Press an element if it shows on the current frame
    ///
    /// A press within `min_interval` of the last recorded press of the same
    /// element is skipped. Pass [`Duration::ZERO`] to press every time.
    fn click_if_visible(
        &mut self,
        element: UiElement,
        clicks: &mut ClickIntervals,
        min_interval: Duration,
    ) -> Result<bool, DeviceError> {
        let now = self.now();
        if !self.is_visible(element) || !clicks.ready(element, min_interval, now) {
            return Ok(false);
        }
        self.click(element)?;
        clicks.record(element, now);
        Ok(true)
    }

    /// Capture until an element appears
    fn wait_until_visible(&mut self, element: UiElement) -> Result<(), DeviceError> {
        loop {
            self.screenshot()?;
            if self.is_visible(element) {
                return Ok(());
            }
        }
    }

    /// Capture until an element appears or the timeout passes
    ///
    /// Returns whether the element appeared.
    fn wait_until_visible_timeout(
        &mut self,
        element: UiElement,
        timeout: Duration,
    ) -> Result<bool, DeviceError> {
        let start = self.now();
        loop {
            self.screenshot()?;
            if self.is_visible(element) {
                return Ok(true);
            }
            if self.now().saturating_duration_since(start) >= timeout {
                return Ok(false);
            }
        }
    }

    /// Capture until an element appears, then press it
    fn wait_until_visible_then_click(&mut self, element: UiElement) -> Result<(), DeviceError> {
        self.wait_until_visible(element)?;
        self.click(element)
    }

    /// Capture until an element is gone
    fn wait_until_gone(&mut self, element: UiElement) -> Result<(), DeviceError> {
        loop {
            self.screenshot()?;
            if !self.is_visible(element) {
                return Ok(());
            }
        }
    }

    /// If an info bar shows on the current frame, wait for it to clear
    ///
    /// Returns whether there was one.
    fn dismiss_info_bar(&mut self) -> Result<bool, DeviceError> {
        if !self.is_visible(UiElement::InfoBar) {
            return Ok(false);
        }
        self.wait_until_gone(UiElement::InfoBar)?;
        Ok(true)
    }

    /// Keep clearing info bars for a while, capturing at least once
    fn ensure_no_info_bar(&mut self, timeout: Duration) -> Result<(), DeviceError> {
        let start = self.now();
        loop {
            self.screenshot()?;
            self.dismiss_info_bar()?;
            if self.now().saturating_duration_since(start) >= timeout {
                return Ok(());
            }
        }
    }
}

/// Device errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Screenshot failed: {0}")]
    CaptureFailed(String),
    #[error("Input failed: {0}")]
    InputFailed(String),
    #[error("No more frames to replay")]
    Exhausted,
}
