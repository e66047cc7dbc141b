//! Native Windows implementation of the platform seam.

pub(crate) mod utils;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, mpsc};
use std::time::Duration;

use active_window_core::{ActiveWindowError, ActiveWindowResult};
use tracing::debug;

use super::{FocusSignal, Platform, ProcessHandle, WindowHandle};

use windows_sys::Win32::{
    Foundation::{HWND, RPC_E_CHANGED_MODE},
    System::Com::{COINIT_MULTITHREADED, CoInitializeEx},
    System::Threading::GetCurrentThreadId,
    UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent},
    UI::WindowsAndMessaging::{
        DispatchMessageW, EVENT_OBJECT_NAMECHANGE, EVENT_SYSTEM_FOREGROUND, GetMessageW, KillTimer,
        MSG, PostThreadMessageW, SetTimer, TranslateMessage, WINEVENT_OUTOFCONTEXT, WM_NULL,
        WM_TIMER,
    },
};

/// Process-wide table mapping each installed event hook to the signal
/// channel of the loop that owns it. The platform invokes the hook callback
/// with only the hook handle as context, so this table is the sole way to
/// reach the right engine instance; multiple engines in one process each
/// register their own entry.
static HOOK_SINKS: LazyLock<Mutex<HashMap<isize, mpsc::Sender<FocusSignal>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Platform seam realized with `windows-sys`.
#[derive(Debug, Default)]
pub struct NativePlatform {}

impl NativePlatform {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

impl Platform for NativePlatform {
    fn initialize(&self) -> ActiveWindowResult<()> {
        // shell icon extraction runs on COM; RPC_E_CHANGED_MODE means the
        // host already initialized COM in another mode, which is still usable
        let hr = unsafe { CoInitializeEx(std::ptr::null(), COINIT_MULTITHREADED) };
        if hr < 0 && hr != RPC_E_CHANGED_MODE {
            return Err(ActiveWindowError::Imaging(format!(
                "COM initialization failed (HRESULT {hr:#010x})"
            )));
        }
        Ok(())
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        utils::foreground_window()
    }

    fn window_title(&self, window: WindowHandle) -> String {
        utils::window_title(window)
    }

    fn window_process_id(&self, window: WindowHandle) -> u32 {
        utils::window_process_id(window)
    }

    fn open_process(&self, pid: u32) -> Option<Box<dyn ProcessHandle>> {
        utils::open_process(pid).map(|process| Box::new(process) as Box<dyn ProcessHandle>)
    }

    fn child_windows(&self, window: WindowHandle) -> Vec<WindowHandle> {
        utils::child_windows(window)
    }

    fn file_description(&self, path: &str) -> Option<String> {
        utils::file_description(path)
    }

    fn executable_icon(&self, path: &str) -> Option<image::RgbaImage> {
        match utils::executable_icon(path) {
            Ok(image) => Some(image),
            Err(e) => {
                debug!(path, "failed to extract executable icon: {e}");
                None
            }
        }
    }

    fn pump_events(
        &self,
        tick: Duration,
        shutdown: &AtomicBool,
        sink: &mut dyn FnMut(FocusSignal),
    ) {
        let (sender, receiver) = mpsc::channel();

        // one hook covers the whole event range; the callback filters it
        // down to the two events of interest
        let hook = unsafe {
            SetWinEventHook(
                EVENT_SYSTEM_FOREGROUND,
                EVENT_OBJECT_NAMECHANGE,
                std::ptr::null_mut(),
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT,
            )
        };
        if hook.is_null() {
            debug!("failed to install focus-change hook");
            return;
        }
        register_hook(hook as isize, sender);

        // periodic wake-up so the blocking retrieval below can observe a
        // shutdown request; the platform wait has no cancellation primitive
        let timer = unsafe { SetTimer(std::ptr::null_mut(), 0, tick.as_millis() as u32, None) };

        let mut msg: MSG = unsafe { std::mem::zeroed() };
        loop {
            let ret = unsafe { GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) };
            if ret == -1 {
                continue;
            }
            if ret == 0 {
                break;
            }

            if msg.message == WM_TIMER && shutdown.load(Ordering::Acquire) {
                break;
            }

            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            // hook callbacks run on this thread during the retrieval above
            // and each send posts a wake-up message, so queued signals are
            // drained as soon as they arrive
            while let Ok(signal) = receiver.try_recv() {
                sink(signal);
            }
        }

        unsafe {
            KillTimer(std::ptr::null_mut(), timer);
            UnhookWinEvent(hook);
        }
        deregister_hook(hook as isize);
    }
}

fn register_hook(hook: isize, sender: mpsc::Sender<FocusSignal>) {
    let mut sinks = match HOOK_SINKS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    sinks.insert(hook, sender);
}

fn deregister_hook(hook: isize) {
    let mut sinks = match HOOK_SINKS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    sinks.remove(&hook);
}

unsafe extern "system" fn win_event_proc(
    hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    let signal = match event {
        EVENT_SYSTEM_FOREGROUND => FocusSignal::FocusChanged(hwnd as WindowHandle),
        EVENT_OBJECT_NAMECHANGE => FocusSignal::TitleChanged(hwnd as WindowHandle),
        _ => return,
    };

    let sinks = match HOOK_SINKS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(sender) = sinks.get(&(hook as isize))
        && sender.send(signal).is_ok()
    {
        // the out-of-context callback runs inside the pump's blocking
        // retrieval, which does not return for hook deliveries; without a
        // posted message the channel would sit undrained until the next
        // liveness tick
        unsafe { PostThreadMessageW(GetCurrentThreadId(), WM_NULL, 0, 0) };
    }
}
