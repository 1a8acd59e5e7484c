//! Simulation core of a 2D side-scrolling platformer.
//!
//! - [`entities`] – entity record, categories and variant state
//! - [`physics`] – per-frame vertical integration and gravity
//! - [`movement`] – player input, power-ups, health, enemy patrols
//! - [`collision`] – directional contact classification and the resolver
//! - [`level`] – the level stage that owns entities and runs frames
//! - [`config`] – INI-backed game settings

pub mod collision;
pub mod config;
pub mod entities;
pub mod error;
pub mod level;
pub mod movement;
pub mod physics;

pub use collision::{CollisionEvent, Signal, Snapshot};
pub use entities::{Category, Entity, Intent};
pub use error::{ConfigError, EntityError, StageError};
pub use level::{BuiltinLevels, LevelSource, Stage, StageEvent};
