//! Alarm logic for a stealth-game prototype: a thief controller, a trigger
//! zone and an alarm whose volume ramps up while the thief is inside.
//!
//! Everything is stepped once per frame by the caller; nothing here owns a
//! game loop or any global state.

pub mod config;
pub mod ramp;
pub mod signaling;
pub mod siren;
pub mod thief;
pub mod trigger;
pub mod world;

// Audio output layer
pub mod sink;

#[cfg(feature = "bounce")]
pub mod bounce;

pub mod utils;

pub use config::{SignalConfig, ThiefConfig};
pub use ramp::{approximately, move_towards, RampPhase, StepOutcome, VolumeRamp};
pub use signaling::Signaling;
pub use sink::{AudioSink, MemorySink, SharedSink};
pub use thief::{CameraBasis, FlatGround, Ground, Thief, ThiefInput};
pub use trigger::{Occupant, SignalTarget, SignalingTrigger, TriggerZone, ZoneEvent};
pub use world::{vault_scene, FrameReport, Patrol, Waypoint, Waypoints};
