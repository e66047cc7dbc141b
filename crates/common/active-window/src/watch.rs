use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread::JoinHandle;
use std::time::Duration;

use active_window_core::{ActiveWindowError, ActiveWindowResult};
use tracing::debug;

use crate::extractor::WindowInfoExtractor;
use crate::platform::{FocusSignal, Platform};
use crate::registry::WatchRegistry;

/// Background loop listening for focus-change notifications and fanning the
/// resolved window out to subscribers.
///
/// Started lazily on the first subscription and kept alive until the engine
/// is dropped, even when the subscriber count returns to zero; re-arming the
/// platform hook on every subscribe cycle costs more than an idle loop.
/// Shutdown is cooperative: the flag is observed on the platform's liveness
/// tick, so worst-case shutdown latency equals one tick period, after which
/// the thread is joined.
pub(crate) struct FocusWatchLoop {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FocusWatchLoop {
    pub(crate) fn spawn(
        platform: Arc<dyn Platform>,
        extractor: Arc<WindowInfoExtractor>,
        registry: Arc<WatchRegistry>,
        tick: Duration,
    ) -> ActiveWindowResult<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);

        let handle = std::thread::Builder::new()
            .name("active-window-watch".into())
            .spawn(move || {
                let signal_platform = Arc::clone(&platform);
                let mut sink = move |signal: FocusSignal| {
                    dispatch(signal_platform.as_ref(), &extractor, &registry, signal);
                };
                platform.pump_events(tick, &thread_shutdown, &mut sink);
                debug!("watch loop exited");
            })
            .map_err(|e| {
                ActiveWindowError::platform(format!("failed to spawn watch thread: {e}"))
            })?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    pub(crate) fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FocusWatchLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handles one raw platform signal: drops title changes for background
/// windows, resolves the current foreground window and notifies subscribers.
fn dispatch(
    platform: &dyn Platform,
    extractor: &WindowInfoExtractor,
    registry: &WatchRegistry,
    signal: FocusSignal,
) {
    let Some(foreground) = platform.foreground_window() else {
        return;
    };

    if let FocusSignal::TitleChanged(window) = signal
        && window != foreground
    {
        // title changed on a background window, irrelevant
        return;
    }

    if let Some(info) = extractor.resolve(foreground) {
        registry.notify_all(&info);
    }
}
