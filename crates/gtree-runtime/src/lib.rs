#![forbid(unsafe_code)]

//! Runtime for the gtree viewer.
//!
//! - [`Model`] - application state and behavior
//! - [`Cmd`] - side effects requested by the model
//! - [`Program`] - the terminal event loop
//! - [`ProgramSimulator`] - headless runner for tests

pub mod program;
pub mod simulator;

pub use program::{Cmd, FullscreenCallback, Model, Program, ProgramConfig, to_region, ui_region};
pub use simulator::{CmdRecord, ProgramSimulator};
