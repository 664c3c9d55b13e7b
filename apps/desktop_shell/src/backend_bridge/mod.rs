//! Backend bridge: command queue from the UI thread to the backend worker.

pub mod commands;
pub mod runtime;
