use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use active_window_core::{IconCache, WindowInfo};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use tracing::debug;

use crate::platform::{Platform, ProcessHandle};

/// Turns icon resources and package logos into encoded data URIs, bounding
/// repeated extraction cost through the icon cache.
///
/// Every failure degrades to an empty string and caches nothing; callers
/// never observe partial payloads.
pub(crate) struct IconResolver {
    platform: Arc<dyn Platform>,
    cache: Option<Mutex<Box<dyn IconCache>>>,
}

impl IconResolver {
    pub(crate) fn new(platform: Arc<dyn Platform>, cache: Option<Box<dyn IconCache>>) -> Self {
        Self {
            platform,
            cache: cache.map(Mutex::new),
        }
    }

    /// Encoded icon for an ordinary executable.
    ///
    /// The executable only exposes an icon resource, so the pipeline is
    /// rasterize, PNG-encode in memory, then base64-wrap.
    pub(crate) fn icon_for_executable(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if let Some(icon) = self.cached(path) {
            return icon;
        }

        let Some(image) = self.platform.executable_icon(path) else {
            debug!(path, "no icon resource available for executable");
            return String::new();
        };

        let Some(png) = encode_png(&image) else {
            return String::new();
        };

        let icon = data_uri(&png);
        self.store(path, &icon);
        icon
    }

    /// Encoded logo for a packaged application.
    ///
    /// Packaged apps ship a manifest-declared static logo image; the file is
    /// used as-is, no rasterization step. Cached under the package install
    /// directory.
    pub(crate) fn icon_for_package(&self, process: &dyn ProcessHandle) -> String {
        let Some(install_dir) = process.package_install_path() else {
            debug!("packaged process has no resolvable install path");
            return String::new();
        };
        let key = install_dir.to_string_lossy().into_owned();
        if let Some(icon) = self.cached(&key) {
            return icon;
        }

        let Some(logo) = self.platform.package_logo(&install_dir) else {
            debug!(package = %key, "package manifest declares no logo");
            return String::new();
        };

        let logo_path = existing_logo_variant(install_dir.join(logo));
        let bytes = match std::fs::read(&logo_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(logo = %logo_path.display(), "failed to read package logo: {e}");
                return String::new();
            }
        };

        let icon = data_uri(&bytes);
        self.store(&key, &icon);
        icon
    }

    fn cached(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let guard = match cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !guard.has(key) {
            return None;
        }
        guard.get(key)
    }

    fn store(&self, key: &str, icon: &str) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let mut guard = match cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.set(key, icon.to_owned());
    }
}

/// Packaged logos ship scale-qualified variants; when the declared file does
/// not exist, retry with a `scale-100` qualifier before the extension.
fn existing_logo_variant(declared: PathBuf) -> PathBuf {
    if declared.exists() {
        return declared;
    }
    scale_100_variant(&declared).unwrap_or(declared)
}

fn scale_100_variant(declared: &Path) -> Option<PathBuf> {
    let extension = declared.extension()?;
    let mut scaled = declared.to_path_buf();
    scaled.set_extension(format!("scale-100.{}", extension.to_string_lossy()));
    Some(scaled)
}

fn encode_png(image: &image::RgbaImage) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    if let Err(e) = image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png) {
        debug!("failed to encode icon as PNG: {e}");
        return None;
    }
    Some(bytes)
}

fn data_uri(bytes: &[u8]) -> String {
    format!("{}{}", WindowInfo::ICON_PREFIX, BASE64_STANDARD.encode(bytes))
}
