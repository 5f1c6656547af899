//! Ambush and air raid handling
//!
//! An air raid only needs waiting out. An ambush raises a prompt that is
//! either evaded (and the info bar then reports how that went) or attacked
//! straight away.

use super::{AmbushOutcome, AmbushStats, Combat, ConfirmTimer, ExpectedEnd, HandlerError};
use crate::config::{AmbushMode, Settings};
use crate::device::{ClickIntervals, Device, UiElement};
use crate::vision::{crop, GlyphClassifier, GlyphLabel, GlyphSet, OverlayDetector};

/// Detects map events and drives them to completion
pub struct AmbushHandler {
    pub(super) settings: Settings,
    pub(super) glyphs: GlyphClassifier,
    pub(super) stats: AmbushStats,
    ambush: OverlayDetector,
    air_raid: OverlayDetector,
    clicks: ClickIntervals,
}

impl AmbushHandler {
    pub fn new(settings: Settings, glyphs: GlyphClassifier) -> Self {
        let detection = &settings.detection;
        let regions = &settings.regions;

        let ambush = OverlayDetector::new(
            "Ambush",
            regions.ambush,
            regions.ambush_reference,
            detection.ambush_threshold,
            detection.overlay_red,
        );
        let air_raid = OverlayDetector::new(
            "Air raid",
            regions.air_raid,
            regions.air_raid_reference,
            detection.air_raid_threshold,
            detection.overlay_red,
        );

        Self {
            settings,
            glyphs,
            stats: AmbushStats::default(),
            ambush,
            air_raid,
            clicks: ClickIntervals::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn glyphs(&self) -> &GlyphClassifier {
        &self.glyphs
    }

    pub fn stats(&self) -> &AmbushStats {
        &self.stats
    }

    /// Sample both overlay reference colors from the current frame
    ///
    /// Call on a clean map frame, right after entering the map.
    pub fn load_reference_colors(&mut self, device: &dyn Device) -> Result<(), HandlerError> {
        self.ambush.load_reference(device.image())?;
        self.air_raid.load_reference(device.image())?;
        Ok(())
    }

    fn ambush_appear(&self, device: &dyn Device) -> Result<bool, HandlerError> {
        Ok(self.ambush.is_present(device.image())?)
    }

    fn air_raid_appear(&self, device: &dyn Device) -> Result<bool, HandlerError> {
        Ok(self.air_raid.is_present(device.image())?)
    }

    /// Capture until the air raid overlay has stayed away for the confirm window
    pub fn wait_out_air_raid(&mut self, device: &mut dyn Device) -> Result<(), HandlerError> {
        log::info!("Map air raid");
        self.stats.air_raids += 1;

        let mut disappear = ConfirmTimer::new(self.settings.detection.air_raid_confirm());
        disappear.start_at(device.now());
        loop {
            device.screenshot()?;
            let present = self.air_raid_appear(device)?;
            if disappear.tick_at(present, device.now()) {
                break;
            }
        }

        Ok(())
    }

    /// Press evade and act on the result shown in the info bar
    pub fn evade_ambush(
        &mut self,
        device: &mut dyn Device,
        combat: &mut dyn Combat,
    ) -> Result<AmbushOutcome, HandlerError> {
        log::info!("Map ambushed");
        device.wait_until_visible_then_click(UiElement::AmbushEvade)?;

        device.wait_until_visible(UiElement::InfoBar)?;
        let bar = crop(device.image(), self.settings.regions.info_bar)?;

        let outcome = match self.glyphs.classify(GlyphSet::AmbushEvade, &bar) {
            Some(GlyphLabel::EvadeSuccess) => {
                log::info!("Ambush_evade: success");
                AmbushOutcome::Evaded
            }
            Some(GlyphLabel::EvadeFailed) => {
                log::info!("Ambush_evade: failed");
                combat.engage(device, ExpectedEnd::NoSearching)?;
                AmbushOutcome::EvadeFailed
            }
            _ => {
                log::warn!("Unrecognised info when ambush evade.");
                device.ensure_no_info_bar(self.settings.timings.info_bar_timeout())?;
                if combat.combat_appear(device) {
                    combat.engage(device, ExpectedEnd::Any)?;
                }
                AmbushOutcome::Unrecognized
            }
        };

        self.stats.record(outcome);
        Ok(outcome)
    }

    /// Press attack until the battle starts, clearing dialogs in between
    pub fn attack_ambush(
        &mut self,
        device: &mut dyn Device,
        combat: &mut dyn Combat,
    ) -> Result<AmbushOutcome, HandlerError> {
        log::info!("Map ambushed");
        device.wait_until_visible(UiElement::AmbushEvade)?;

        let interval = self.settings.timings.attack_click_interval();
        loop {
            if device.click_if_visible(UiElement::AmbushAttack, &mut self.clicks, interval)? {
                continue;
            }
            if combat.handle_low_emotion(device)? {
                continue;
            }
            if combat.handle_retirement(device)? {
                continue;
            }

            // Break
            if combat.combat_appear(device) {
                break;
            }

            device.screenshot()?;
        }

        log::info!("Ambush_evade: attack");
        combat.engage(device, ExpectedEnd::NoSearching)?;

        self.stats.record(AmbushOutcome::Attacked);
        Ok(AmbushOutcome::Attacked)
    }

    fn resolve_ambush(
        &mut self,
        device: &mut dyn Device,
        combat: &mut dyn Combat,
    ) -> Result<AmbushOutcome, HandlerError> {
        match self.settings.map.ambush_mode {
            AmbushMode::Evade => self.evade_ambush(device, combat),
            AmbushMode::Attack => self.attack_ambush(device, combat),
        }
    }

    /// Check the current frame for an air raid or ambush and resolve it
    ///
    /// Returns true when an overlay was detected and its event resolved.
    /// An ambush prompt found without its overlay is resolved as well but
    /// still reported as false.
    pub fn handle_ambush(
        &mut self,
        device: &mut dyn Device,
        combat: &mut dyn Combat,
    ) -> Result<bool, HandlerError> {
        if !self.settings.map.has_ambush {
            return Ok(false);
        }

        if self.air_raid_appear(device)? {
            self.wait_out_air_raid(device)?;
            return Ok(true);
        }

        if self.ambush_appear(device)? {
            self.resolve_ambush(device, combat)?;
            return Ok(true);
        }

        if device.is_visible(UiElement::AmbushEvade) {
            self.resolve_ambush(device, combat)?;
        }

        Ok(false)
    }
}
