#![forbid(unsafe_code)]

//! Shared foundations of the gtree viewer: cell geometry, input events and
//! their crossterm mapping, the raw-mode terminal guard, and the logging
//! facade the other library crates log through.

pub mod event;
pub mod geometry;
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal_session;

#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};
