//! Package-manifest queries shared by platform implementations.

use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "AppxManifest.xml";

/// Reads the logo resource path declared in the package manifest under
/// `install_dir`, relative to that directory.
pub fn declared_logo(install_dir: &Path) -> Option<PathBuf> {
    let manifest = std::fs::read_to_string(install_dir.join(MANIFEST_FILE)).ok()?;
    logo_property(&manifest).map(PathBuf::from)
}

/// Extracts the `Logo` property value from manifest XML.
fn logo_property(manifest: &str) -> Option<&str> {
    let start = manifest.find("<Logo>")? + "<Logo>".len();
    let end = manifest[start..].find("</Logo>")? + start;
    let logo = manifest[start..end].trim();
    (!logo.is_empty()).then_some(logo)
}
