//! Map event handlers
//!
//! Reacts to ambushes, air raids and out-of-step notices while a fleet
//! moves on the map. Everything here runs synchronously on the caller's
//! polling loop, and each flow keeps capturing frames until its end
//! condition holds.

pub mod ambush;
pub mod timer;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceError};
use crate::vision::VisionError;

pub use ambush::AmbushHandler;
pub use timer::ConfirmTimer;

/// How a combat is expected to end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedEnd {
    /// Whatever screen follows the battle
    Any,
    /// Back on the map with no enemy search in progress
    NoSearching,
}

/// The combat sub-system and the dialogs that interrupt it
pub trait Combat {
    /// Whether the current frame shows a combat preparation screen
    fn combat_appear(&mut self, device: &mut dyn Device) -> bool;

    /// Deal with a low morale warning; returns whether one was handled
    fn handle_low_emotion(&mut self, device: &mut dyn Device) -> Result<bool, HandlerError>;

    /// Deal with a dock-full retirement prompt; returns whether one was handled
    fn handle_retirement(&mut self, device: &mut dyn Device) -> Result<bool, HandlerError>;

    /// Run a full battle until the expected end screen
    fn engage(&mut self, device: &mut dyn Device, expected_end: ExpectedEnd) -> Result<(), HandlerError>;
}

/// How an ambush was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmbushOutcome {
    /// Evade succeeded
    Evaded,
    /// Evade failed and the fleet fought
    EvadeFailed,
    /// The info bar said something else
    Unrecognized,
    /// The fleet attacked
    Attacked,
}

impl AmbushOutcome {
    /// Log attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbushOutcome::Evaded => "success",
            AmbushOutcome::EvadeFailed => "failed",
            AmbushOutcome::Unrecognized => "unrecognized",
            AmbushOutcome::Attacked => "attack",
        }
    }
}

/// Event counters for the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbushStats {
    pub air_raids: u32,
    pub ambushes: u32,
    pub evaded: u32,
    pub evade_failed: u32,
    pub unrecognized: u32,
    pub attacked: u32,
    pub out_of_step: u32,
}

impl AmbushStats {
    pub fn record(&mut self, outcome: AmbushOutcome) {
        self.ambushes += 1;
        match outcome {
            AmbushOutcome::Evaded => self.evaded += 1,
            AmbushOutcome::EvadeFailed => self.evade_failed += 1,
            AmbushOutcome::Unrecognized => self.unrecognized += 1,
            AmbushOutcome::Attacked => self.attacked += 1,
        }
    }
}

/// Handler errors
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("Combat failed: {0}")]
    Combat(String),
}
