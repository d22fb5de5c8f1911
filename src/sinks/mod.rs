//! Sink implementations

pub mod console;
pub mod rotating_file;
pub mod rotation;

pub use console::{ConsoleSink, ConsoleStream};
pub use rotating_file::{RotatingFileSink, RotationPolicy};
pub use rotation::{RotationSchedule, RotationWhen};

// Re-export the trait so custom sinks only need this module
pub use crate::core::Sink;
