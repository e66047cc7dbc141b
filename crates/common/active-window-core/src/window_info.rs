use serde::{Deserialize, Serialize};

/// Fully resolved description of the currently focused top-level window.
///
/// A fresh record is built on every resolution and never mutated afterwards.
/// All text fields are present but may be empty when the platform could not
/// supply the value; `icon` is either empty or a complete
/// [`Self::ICON_PREFIX`]-prefixed data URI, never partial data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Window title as reported by the OS; empty when the window has none.
    pub title: String,
    /// Process id owning the foreground window.
    pub pid: u32,
    /// Absolute path of the resolved executable. For packaged applications
    /// this is the hosted application's executable, not the shell container.
    pub path: String,
    /// Human-readable application name; falls back to the path's file name
    /// component when the executable carries no version metadata.
    pub application: String,
    /// Encoded icon image, or empty when extraction failed at any stage.
    pub icon: String,
    /// Whether the window belongs to a packaged application launched under
    /// a shell container process.
    pub is_packaged_app: bool,
    /// Package family identifier; empty unless `is_packaged_app` is set.
    pub package_identity: String,
}

impl WindowInfo {
    /// Prefix every non-empty `icon` value starts with.
    pub const ICON_PREFIX: &'static str = "data:image/png;base64,";
}
