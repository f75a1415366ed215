//! Locating the browser binary that `BROWSER` asks for.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use storefront_core::BrowserKind;

/// Binary names searched on `PATH`, most specific first.
pub fn executable_names(kind: BrowserKind) -> &'static [&'static str] {
    match kind {
        #[cfg(target_os = "windows")]
        BrowserKind::Chrome => &["chrome.exe"],
        #[cfg(not(target_os = "windows"))]
        BrowserKind::Chrome => &["google-chrome-stable", "google-chrome", "chrome"],
        #[cfg(target_os = "windows")]
        BrowserKind::Chromium => &["chromium.exe"],
        #[cfg(not(target_os = "windows"))]
        BrowserKind::Chromium => &["chromium", "chromium-browser"],
    }
}

fn install_paths(kind: BrowserKind) -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let app = match kind {
            BrowserKind::Chrome => "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            BrowserKind::Chromium => "/Applications/Chromium.app/Contents/MacOS/Chromium",
        };
        vec![PathBuf::from(app)]
    }

    #[cfg(not(target_os = "macos"))]
    {
        let _ = kind;
        Vec::new()
    }
}

/// First executable for `kind` found in the `PATH`-style list `paths`.
pub fn find_executable_in(kind: BrowserKind, paths: &OsStr) -> Option<PathBuf> {
    executable_names(kind)
        .iter()
        .find_map(|name| which::which_in(name, Some(paths), Path::new(".")).ok())
}

/// Executable for `kind` on `PATH` or in the platform's install location.
pub fn find_executable(kind: BrowserKind) -> Option<PathBuf> {
    std::env::var_os("PATH")
        .and_then(|paths| find_executable_in(kind, &paths))
        .or_else(|| install_paths(kind).into_iter().find(|p| p.exists()))
}
