use std::sync::{Arc, Mutex};

use active_window_core::{
    ActiveWindowResult, EngineConfig, FixedCapacityIconCache, IconCache, WindowInfo,
};

use crate::extractor::WindowInfoExtractor;
use crate::icon::IconResolver;
use crate::platform::Platform;
use crate::registry::{WatchId, WatchRegistry};
use crate::watch::FocusWatchLoop;

/// Active-window observation engine.
///
/// Exposes a synchronous query for the current foreground window and a
/// subscription interface delivering a fresh [`WindowInfo`] on every focus
/// or foreground-title change. One engine owns at most one background watch
/// loop; dropping the engine stops the loop and joins its thread.
pub struct ActiveWindowEngine {
    platform: Arc<dyn Platform>,
    extractor: Arc<WindowInfoExtractor>,
    registry: Arc<WatchRegistry>,
    config: EngineConfig,
    watch: Mutex<Option<FocusWatchLoop>>,
}

impl ActiveWindowEngine {
    /// Builds an engine backed by the native platform.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the platform's imaging
    /// subsystem cannot be started; nothing downstream can function without
    /// it.
    #[cfg(target_os = "windows")]
    pub fn new(config: EngineConfig) -> ActiveWindowResult<Self> {
        Self::with_platform(
            Arc::new(crate::platform::windows::NativePlatform::new()),
            config,
        )
    }

    /// Builds an engine on an explicit platform implementation, constructing
    /// the default fixed-capacity icon cache from the configuration.
    ///
    /// # Errors
    ///
    /// Fails when the platform's imaging subsystem cannot be started.
    pub fn with_platform(
        platform: Arc<dyn Platform>,
        config: EngineConfig,
    ) -> ActiveWindowResult<Self> {
        let cache: Option<Box<dyn IconCache>> = match config.icon_cache_capacity {
            0 => None,
            capacity => Some(Box::new(FixedCapacityIconCache::new(capacity))),
        };
        Self::with_icon_cache(platform, cache, config)
    }

    /// Builds an engine with a caller-provided icon cache. `None` disables
    /// caching regardless of the configured capacity.
    ///
    /// # Errors
    ///
    /// Fails when the platform's imaging subsystem cannot be started.
    pub fn with_icon_cache(
        platform: Arc<dyn Platform>,
        cache: Option<Box<dyn IconCache>>,
        config: EngineConfig,
    ) -> ActiveWindowResult<Self> {
        platform.initialize()?;

        let icons = IconResolver::new(Arc::clone(&platform), cache);
        let extractor = Arc::new(WindowInfoExtractor::new(Arc::clone(&platform), icons));

        Ok(Self {
            platform,
            extractor,
            registry: Arc::new(WatchRegistry::new()),
            config,
            watch: Mutex::new(None),
        })
    }

    /// Synchronously resolves the current foreground window on the caller's
    /// thread, bypassing the watch loop.
    ///
    /// `None` means no usable active window right now: no foreground window
    /// exists, its process already exited or denied access, or a shell
    /// container hosts no qualifying packaged application.
    pub fn get_active_window(&self) -> Option<WindowInfo> {
        let window = self.platform.foreground_window()?;
        self.extractor.resolve(window)
    }

    /// Registers `callback` for focus-change notifications, starting the
    /// watch loop if it is not running yet.
    ///
    /// # Errors
    ///
    /// Fails when the watch thread cannot be spawned.
    pub fn watch_active_window<F>(&self, callback: F) -> ActiveWindowResult<WatchId>
    where
        F: Fn(&WindowInfo) + Send + 'static,
    {
        let id = self.registry.add(Box::new(callback));
        self.ensure_watch_loop()?;
        Ok(id)
    }

    /// Removes a subscription; unknown ids are ignored. The watch loop stays
    /// armed even at zero subscribers.
    pub fn unwatch_active_window(&self, id: WatchId) {
        self.registry.remove(id);
    }

    /// Stops the watch loop and joins its thread. Dropping the engine does
    /// the same; an explicit call makes teardown latency observable.
    pub fn shutdown(&self) {
        if let Some(mut running) = self.lock_watch().take() {
            running.stop();
        }
    }

    fn ensure_watch_loop(&self) -> ActiveWindowResult<()> {
        let mut watch = self.lock_watch();
        if watch.is_none() {
            *watch = Some(FocusWatchLoop::spawn(
                Arc::clone(&self.platform),
                Arc::clone(&self.extractor),
                Arc::clone(&self.registry),
                self.config.liveness_tick,
            )?);
        }
        Ok(())
    }

    fn lock_watch(&self) -> std::sync::MutexGuard<'_, Option<FocusWatchLoop>> {
        match self.watch.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for ActiveWindowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveWindowEngine")
            .field("config", &self.config)
            .field("watching", &self.lock_watch().is_some())
            .finish_non_exhaustive()
    }
}
