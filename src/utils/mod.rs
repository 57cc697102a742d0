//! Utility modules shared by the binary and the demos

pub mod logging;
pub mod pacing;

pub use logging::{init_logger, init_logger_with_level};
pub use pacing::FramePacer;
