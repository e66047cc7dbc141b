//! Basic example printing the currently focused window once.
//!
//! Usage: cargo run --example active_window

#[cfg(target_os = "windows")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use active_window::{ActiveWindowEngine, EngineConfig};

    tracing_subscriber::fmt::init();

    let engine = ActiveWindowEngine::new(EngineConfig::default())?;

    match engine.get_active_window() {
        Some(window) => {
            println!("🪟 Active window: {}", window.title);
            println!("   Application: {}", window.application);
            println!("   PID: {}", window.pid);
            println!("   Path: {}", window.path);
            if window.is_packaged_app {
                println!("   📦 Packaged app: {}", window.package_identity);
            }
            let icon_status = if window.icon.is_empty() {
                "❌ No icon"
            } else {
                "✅ Has icon"
            };
            println!("   Icon: {}", icon_status);
        }
        None => println!("❌ No resolvable active window right now"),
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn main() {
    println!("The native active-window backend is only available on Windows.");
}
