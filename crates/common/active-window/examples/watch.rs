//! Example subscribing to focus changes until Ctrl+C.
//!
//! Usage: cargo run --example watch

#[cfg(target_os = "windows")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use active_window::{ActiveWindowEngine, EngineConfig};

    tracing_subscriber::fmt::init();

    println!("🔍 Watching for focus changes...");
    println!("   Switch between applications to see notifications.");
    println!("   Press Ctrl+C to exit.");
    println!();

    let config = EngineConfig::builder()
        .liveness_tick(Duration::from_millis(500))?
        .icon_cache_capacity(32)
        .build();
    let engine = ActiveWindowEngine::new(config)?;

    let event_count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&event_count);
    let id = engine.watch_active_window(move |window| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("📱 Focus Event #{}: {}", n, window.title);
        println!("   Application: {}", window.application);
        if window.is_packaged_app {
            println!("   📦 Package: {}", window.package_identity);
        }
        println!();
    })?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\n👋 Received Ctrl+C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    engine.unwatch_active_window(id);
    engine.shutdown();

    println!("📊 Total focus events captured: {}", event_count.load(Ordering::SeqCst));
    println!("✨ Done!");

    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn main() {
    println!("The native active-window backend is only available on Windows.");
}
