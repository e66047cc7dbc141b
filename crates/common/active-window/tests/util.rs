//! Shared test doubles for the engine integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use active_window::platform::{FocusSignal, Platform, ProcessHandle, WindowHandle};
use active_window::{
    ActiveWindowEngine, ActiveWindowError, ActiveWindowResult, EngineConfig, IconCache, WindowInfo,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};

/// Scripted process visible to the mock platform.
#[derive(Clone)]
pub struct ProcessSpec {
    pub path: String,
    pub openable: bool,
    pub package_family: Option<String>,
    pub install_dir: Option<PathBuf>,
}

impl ProcessSpec {
    pub fn ordinary(path: &str) -> Self {
        Self {
            path: path.into(),
            openable: true,
            package_family: None,
            install_dir: None,
        }
    }

    pub fn unopenable(path: &str) -> Self {
        Self {
            openable: false,
            ..Self::ordinary(path)
        }
    }

    pub fn packaged(path: &str, family: &str, install_dir: PathBuf) -> Self {
        Self {
            package_family: Some(family.into()),
            install_dir: Some(install_dir),
            ..Self::ordinary(path)
        }
    }
}

/// Scripted top-level or child window.
#[derive(Clone, Default)]
pub struct WindowSpec {
    pub pid: u32,
    pub title: String,
    pub children: Vec<WindowHandle>,
}

impl WindowSpec {
    pub fn new(pid: u32, title: &str) -> Self {
        Self {
            pid,
            title: title.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<WindowHandle>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Default)]
pub struct MockState {
    pub foreground: Option<WindowHandle>,
    pub windows: HashMap<WindowHandle, WindowSpec>,
    pub processes: HashMap<u32, ProcessSpec>,
    pub descriptions: HashMap<String, String>,
    pub icons: HashMap<String, image::RgbaImage>,
}

/// Scripted platform double driving the engine in tests.
///
/// Focus signals are injected through the sender returned by
/// [`signal_source`](Self::signal_source); the pump delivers them until the
/// shutdown flag is observed on a tick, mirroring the native loop's
/// cooperative cancellation.
#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<MockState>,
    signals: Mutex<Option<mpsc::Receiver<FocusSignal>>>,
    pub icon_requests: AtomicUsize,
    pub fail_initialize: AtomicBool,
    pub pump_running: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_foreground(&self, window: Option<WindowHandle>) {
        self.lock_state().foreground = window;
    }

    pub fn add_window(&self, handle: WindowHandle, spec: WindowSpec) {
        self.lock_state().windows.insert(handle, spec);
    }

    pub fn add_process(&self, pid: u32, spec: ProcessSpec) {
        self.lock_state().processes.insert(pid, spec);
    }

    pub fn set_description(&self, path: &str, description: &str) {
        self.lock_state()
            .descriptions
            .insert(path.into(), description.into());
    }

    pub fn set_icon(&self, path: &str, icon: image::RgbaImage) {
        self.lock_state().icons.insert(path.into(), icon);
    }

    /// Wires up the signal channel; must be called before the watch loop
    /// starts pumping.
    pub fn signal_source(&self) -> mpsc::Sender<FocusSignal> {
        let (sender, receiver) = mpsc::channel();
        *self.lock(&self.signals) = Some(receiver);
        sender
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.lock(&self.state)
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct MockProcess {
    spec: ProcessSpec,
}

impl ProcessHandle for MockProcess {
    fn executable_path(&self) -> String {
        self.spec.path.clone()
    }

    fn package_family_name(&self) -> Option<String> {
        self.spec.package_family.clone()
    }

    fn package_install_path(&self) -> Option<PathBuf> {
        self.spec.install_dir.clone()
    }
}

impl Platform for MockPlatform {
    fn initialize(&self) -> ActiveWindowResult<()> {
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(ActiveWindowError::Imaging(
                "scripted imaging startup failure".into(),
            ));
        }
        Ok(())
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.lock_state().foreground
    }

    fn window_title(&self, window: WindowHandle) -> String {
        self.lock_state()
            .windows
            .get(&window)
            .map(|spec| spec.title.clone())
            .unwrap_or_default()
    }

    fn window_process_id(&self, window: WindowHandle) -> u32 {
        self.lock_state()
            .windows
            .get(&window)
            .map(|spec| spec.pid)
            .unwrap_or_default()
    }

    fn open_process(&self, pid: u32) -> Option<Box<dyn ProcessHandle>> {
        let spec = self.lock_state().processes.get(&pid).cloned()?;
        if !spec.openable {
            return None;
        }
        Some(Box::new(MockProcess { spec }))
    }

    fn child_windows(&self, window: WindowHandle) -> Vec<WindowHandle> {
        self.lock_state()
            .windows
            .get(&window)
            .map(|spec| spec.children.clone())
            .unwrap_or_default()
    }

    fn file_description(&self, path: &str) -> Option<String> {
        self.lock_state().descriptions.get(path).cloned()
    }

    fn executable_icon(&self, path: &str) -> Option<image::RgbaImage> {
        self.icon_requests.fetch_add(1, Ordering::SeqCst);
        self.lock_state().icons.get(path).cloned()
    }

    fn pump_events(
        &self,
        tick: Duration,
        shutdown: &std::sync::atomic::AtomicBool,
        sink: &mut dyn FnMut(FocusSignal),
    ) {
        let receiver = self.lock(&self.signals).take();
        self.pump_running.store(true, Ordering::SeqCst);

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }
            match receiver.as_ref() {
                Some(receiver) => match receiver.recv_timeout(tick) {
                    Ok(signal) => sink(signal),
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                },
                None => std::thread::sleep(tick),
            }
        }

        self.pump_running.store(false, Ordering::SeqCst);
    }
}

/// Icon-cache double recording every interaction.
#[derive(Default)]
pub struct CacheStats {
    pub has_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub hits: AtomicUsize,
}

pub struct RecordingCache {
    stats: Arc<CacheStats>,
    entries: HashMap<String, String>,
}

impl RecordingCache {
    pub fn new() -> (Box<dyn IconCache>, Arc<CacheStats>) {
        let stats = Arc::new(CacheStats::default());
        let cache = Box::new(Self {
            stats: Arc::clone(&stats),
            entries: HashMap::new(),
        });
        (cache, stats)
    }
}

impl IconCache for RecordingCache {
    fn has(&self, key: &str) -> bool {
        self.stats.has_calls.fetch_add(1, Ordering::SeqCst);
        let hit = self.entries.contains_key(key);
        if hit {
            self.stats.hits.fetch_add(1, Ordering::SeqCst);
        }
        hit
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stats.get_calls.fetch_add(1, Ordering::SeqCst);
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.stats.set_calls.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(key.to_owned(), value);
    }
}

pub fn engine_with(platform: &Arc<MockPlatform>, config: EngineConfig) -> ActiveWindowEngine {
    ActiveWindowEngine::with_platform(Arc::clone(platform) as Arc<dyn Platform>, config)
        .expect("engine construction should succeed")
}

pub fn sample_icon() -> image::RgbaImage {
    image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 100, 50, 255]))
}

/// Asserts the icon contract and returns the decoded payload bytes.
pub fn decode_icon(icon: &str) -> Vec<u8> {
    assert!(
        icon.starts_with(WindowInfo::ICON_PREFIX),
        "icon must carry the data URI prefix, got: {icon:.40}"
    );
    BASE64_STANDARD
        .decode(&icon[WindowInfo::ICON_PREFIX.len()..])
        .expect("icon payload must be valid base64")
}
