//! Tap generation and click pacing
//!
//! Converts reference coordinates to device pixels and keeps repeated
//! clicks on the same element apart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{Button, UiElement};

/// Reference resolution every region and button is defined in
pub const REF_WIDTH: u32 = 1280;
pub const REF_HEIGHT: u32 = 720;

/// Screen coordinates based on the 1280x720 reference resolution
#[derive(Debug, Clone, Copy)]
pub struct ScreenCoordinates {
    /// Current screen width
    pub screen_width: u32,
    /// Current screen height
    pub screen_height: u32,
}

impl ScreenCoordinates {
    /// Create new screen coordinates
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width,
            screen_height,
        }
    }

    /// Whether the screen already runs at the reference resolution
    pub fn is_reference(&self) -> bool {
        self.screen_width == REF_WIDTH && self.screen_height == REF_HEIGHT
    }

    /// Scale X coordinate from reference to actual screen
    pub fn scale_x(&self, x: i32) -> i32 {
        ((x as f32 * self.screen_width as f32) / REF_WIDTH as f32) as i32
    }

    /// Scale Y coordinate from reference to actual screen
    pub fn scale_y(&self, y: i32) -> i32 {
        ((y as f32 * self.screen_height as f32) / REF_HEIGHT as f32) as i32
    }

    /// Tap for a button on this screen
    pub fn tap(&self, element: UiElement, button: &Button) -> Tap {
        let (x, y) = button.click_point();
        Tap {
            element,
            x: self.scale_x(x),
            y: self.scale_y(y),
        }
    }
}

impl Default for ScreenCoordinates {
    fn default() -> Self {
        Self::new(REF_WIDTH, REF_HEIGHT)
    }
}

/// A tap issued to the device, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub element: UiElement,
    pub x: i32,
    pub y: i32,
}

/// Last click time per element
#[derive(Debug, Default)]
pub struct ClickIntervals {
    last: HashMap<UiElement, Instant>,
}

impl ClickIntervals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `interval` has passed since the element was last clicked
    pub fn ready(&self, element: UiElement, interval: Duration, now: Instant) -> bool {
        match self.last.get(&element) {
            Some(last) => now.saturating_duration_since(*last) >= interval,
            None => true,
        }
    }

    pub fn record(&mut self, element: UiElement, now: Instant) {
        self.last.insert(element, now);
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}
