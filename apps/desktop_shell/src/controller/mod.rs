//! Controller layer: UI events, session lifecycle, and command orchestration.

pub mod enhancements;
pub mod events;
pub mod orchestration;
pub mod session;

pub use session::{BridgeStatus, SessionController, StartupConfig};

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod session_tests;

#[cfg(test)]
#[path = "../tests/events_tests.rs"]
mod events_tests;
