pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerSnapshot, TimerTuning};
pub use state::{TimerState, TimerStatus};
