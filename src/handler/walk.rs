//! Out-of-step notices
//!
//! On maps with a step limit, ordering a fleet further than it can walk
//! brings up an info bar instead of moving it.

use super::{AmbushHandler, HandlerError};
use crate::device::{Device, UiElement};
use crate::vision::{crop, GlyphLabel, GlyphSet};

impl AmbushHandler {
    /// Check the current frame once for an out-of-step notice and dismiss it
    ///
    /// Returns true if a notice was found. Without a visible info bar this
    /// does nothing at all.
    pub fn handle_walk_out_of_step(&mut self, device: &mut dyn Device) -> Result<bool, HandlerError> {
        if !self.settings.map.has_fleet_step {
            return Ok(false);
        }
        if !device.is_visible(UiElement::InfoBar) {
            return Ok(false);
        }

        let bar = crop(device.image(), self.settings.regions.info_bar)?;
        if self.glyphs.classify(GlyphSet::Walk, &bar) == Some(GlyphLabel::WalkOutOfStep) {
            log::warn!("Map walk out of step.");
            self.stats.out_of_step += 1;
            device.dismiss_info_bar()?;
            return Ok(true);
        }

        Ok(false)
    }
}
