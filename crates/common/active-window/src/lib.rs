//! Focused-window observation and resolution engine.
//!
//! Reports the operating system's currently focused top-level window (title,
//! owning process, executable path, application display name and a rendered
//! icon) and notifies subscribers whenever the focused window changes.
//!
//! The OS query surface lives behind the [`platform::Platform`] trait; the
//! native implementation is selected automatically on Windows, and hosts or
//! tests can supply their own via [`ActiveWindowEngine::with_platform`].

pub use active_window_core::*;

mod engine;
mod extractor;
mod icon;
mod registry;
mod watch;

pub mod platform;

pub use engine::ActiveWindowEngine;
pub use registry::WatchId;
