use std::sync::Arc;

use active_window_core::WindowInfo;
use tracing::debug;

use crate::icon::IconResolver;
use crate::platform::{Platform, ProcessHandle, WindowHandle};

/// Process image name of the shell container hosting packaged applications.
const SHELL_CONTAINER_EXE: &str = "ApplicationFrameHost.exe";

/// Turns a raw foreground-window handle into a fully populated record.
pub(crate) struct WindowInfoExtractor {
    platform: Arc<dyn Platform>,
    icons: IconResolver,
}

/// Hosted application adopted from a shell container's descendants, returned
/// by value from the enumeration walk.
struct HostedApp {
    process: Box<dyn ProcessHandle>,
    path: String,
    package_identity: String,
}

impl WindowInfoExtractor {
    pub(crate) fn new(platform: Arc<dyn Platform>, icons: IconResolver) -> Self {
        Self { platform, icons }
    }

    /// Resolves `window` into a [`WindowInfo`] record.
    ///
    /// Returns `None` when there is no usable active window this tick: the
    /// handle is gone, its process cannot be opened, or a shell container
    /// hosts no qualifying packaged application. Missing metadata anywhere
    /// else degrades to empty fields instead of aborting.
    pub(crate) fn resolve(&self, window: WindowHandle) -> Option<WindowInfo> {
        if window == 0 {
            return None;
        }

        let title = self.platform.window_title(window);

        let pid = self.platform.window_process_id(window);
        if pid == 0 {
            debug!(window, "foreground window has no owning process");
            return None;
        }

        // the single hard failure point of the pipeline: without a process
        // handle nothing downstream can be resolved
        let process = self.platform.open_process(pid)?;
        let mut path = process.executable_path();
        drop(process);

        let mut is_packaged_app = false;
        let mut package_identity = String::new();
        let mut hosted: Option<Box<dyn ProcessHandle>> = None;

        if basename(&path) == SHELL_CONTAINER_EXE {
            let app = self.find_hosted_app(window)?;
            path = app.path;
            package_identity = app.package_identity;
            hosted = Some(app.process);
            is_packaged_app = true;
        }

        let application = match self.platform.file_description(&path) {
            Some(description) if !description.is_empty() => description,
            _ => basename(&path).to_owned(),
        };

        let icon = match hosted.as_deref() {
            Some(process) => self.icons.icon_for_package(process),
            None => self.icons.icon_for_executable(&path),
        };

        Some(WindowInfo {
            title,
            pid,
            path,
            application,
            icon,
            is_packaged_app,
            package_identity,
        })
    }

    /// Walks the container's descendant windows for the first process that
    /// both opens and carries a non-empty package identity.
    fn find_hosted_app(&self, container: WindowHandle) -> Option<HostedApp> {
        for child in self.platform.child_windows(container) {
            let pid = self.platform.window_process_id(child);
            if pid == 0 {
                continue;
            }
            let Some(process) = self.platform.open_process(pid) else {
                continue;
            };
            let Some(identity) = process.package_family_name() else {
                continue;
            };
            if identity.is_empty() {
                continue;
            }

            let path = process.executable_path();
            return Some(HostedApp {
                process,
                path,
                package_identity: identity,
            });
        }

        debug!(container, "shell container hosts no qualifying packaged application");
        None
    }
}

/// Path component after the last separator; no extension stripping.
fn basename(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}
