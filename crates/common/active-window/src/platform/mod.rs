//! Seam between the engine core and the operating system.
//!
//! Everything the resolution pipeline and the watch loop need from the OS is
//! expressed through [`Platform`]; the engine never touches a raw OS API
//! directly. The native implementation is compiled per target, and tests
//! drive the engine through a scripted double.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use active_window_core::ActiveWindowResult;

pub mod manifest;

#[cfg(target_os = "windows")]
pub mod windows;

/// Raw identifier of a top-level window, opaque to the engine.
pub type WindowHandle = isize;

/// Raw notification emitted by the platform's focus hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSignal {
    /// The foreground window changed.
    FocusChanged(WindowHandle),
    /// A window's title changed; may concern a background window.
    TitleChanged(WindowHandle),
}

impl FocusSignal {
    #[must_use]
    pub fn window(&self) -> WindowHandle {
        match *self {
            FocusSignal::FocusChanged(window) | FocusSignal::TitleChanged(window) => window,
        }
    }
}

/// A process opened with query-only access, released when dropped.
pub trait ProcessHandle: Send {
    /// Absolute path of the process image; empty when the query fails.
    fn executable_path(&self) -> String;

    /// Package family name for packaged applications, `None` for ordinary
    /// processes.
    fn package_family_name(&self) -> Option<String>;

    /// Install directory of the owning package, if any.
    fn package_install_path(&self) -> Option<PathBuf>;
}

/// Operating-system query surface used by the resolution pipeline and the
/// watch loop.
pub trait Platform: Send + Sync + 'static {
    /// Starts the imaging subsystem backing icon extraction. Called once
    /// during engine construction; failure is fatal to the engine.
    fn initialize(&self) -> ActiveWindowResult<()>;

    /// Currently focused top-level window, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Title of `window`; empty when the window reports none.
    fn window_title(&self, window: WindowHandle) -> String;

    /// Process id owning `window`, or 0 when unavailable.
    fn window_process_id(&self, window: WindowHandle) -> u32;

    /// Opens `pid` with the minimal query-only access right.
    fn open_process(&self, pid: u32) -> Option<Box<dyn ProcessHandle>>;

    /// Descendant windows of `window`, in enumeration order.
    fn child_windows(&self, window: WindowHandle) -> Vec<WindowHandle>;

    /// Localized file-description string from the executable's version
    /// resource, if one exists.
    fn file_description(&self, path: &str) -> Option<String>;

    /// Highest-resolution icon associated with the executable, as a 32-bit
    /// image with the alpha channel preserved.
    fn executable_icon(&self, path: &str) -> Option<image::RgbaImage>;

    /// Logo path declared by the package manifest, relative to
    /// `install_dir`.
    fn package_logo(&self, install_dir: &Path) -> Option<PathBuf> {
        manifest::declared_logo(install_dir)
    }

    /// Blocks delivering raw focus signals to `sink` until `shutdown` is
    /// observed on a liveness tick.
    ///
    /// Signals reach `sink` as they arrive; delivery must not be deferred
    /// to the next tick. The tick wakes the loop periodically because the
    /// platform's blocking notification wait has no cancellation primitive;
    /// it bounds shutdown latency and is never reported as a signal.
    /// Title-change signals are delivered unfiltered; the engine drops the
    /// ones that do not concern the current foreground window.
    fn pump_events(
        &self,
        tick: Duration,
        shutdown: &AtomicBool,
        sink: &mut dyn FnMut(FocusSignal),
    );
}
