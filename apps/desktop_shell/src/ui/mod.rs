//! UI layer for the desktop shell: the native chat window.

pub mod app;

pub use app::ShellApp;
