//! Ambush Sentry - reactive map event handling for screen-driven automation
//!
//! This library watches the screenshot stream of a fleet moving on a map
//! and resolves the transient events that interrupt it: ambushes, air
//! raids and out-of-step notices.
//!
//! ## Detection
//!
//! Ambushes and air raids are recognized by the red overlay they wash over
//! the map (`vision::overlay`). Info bar messages are read by matching the
//! normalized lettering against prepared templates (`vision::glyph`).
//!
//! ## Collaborators
//!
//! Screen capture and input come in through the [`device::Device`] trait,
//! battles through [`handler::Combat`]. The handlers block on their waits;
//! any upper time limit belongs to the caller.

pub mod config;
pub mod device;
pub mod handler;
pub mod vision;

pub use config::{AmbushMode, Settings};
pub use device::{Device, UiElement};
pub use handler::{AmbushHandler, AmbushOutcome, AmbushStats, Combat, ExpectedEnd, HandlerError};
pub use vision::GlyphClassifier;
