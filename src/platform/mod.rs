// Scrollkeeper platform abstraction
// Host-facing seams (viewport, native history settings) and platform-specific paths.

use std::env;
use std::path::PathBuf;

pub mod history;
pub mod viewport;

const APP_DIR: &str = "scrollkeeper";

/// Returns the configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/scrollkeeper` or `~/.config/scrollkeeper`
/// - **macOS**: `~/Library/Application Support/Scrollkeeper`
/// - **Windows**: `%APPDATA%/Scrollkeeper`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Scrollkeeper")
    }
    #[cfg(target_os = "windows")]
    {
        appdata_dir().join("Scrollkeeper")
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR),
            Err(_) => home_dir().join(".config").join(APP_DIR),
        }
    }
}

/// Returns the data directory, where the session storage database lives.
///
/// - **Linux**: `$XDG_DATA_HOME/scrollkeeper` or `~/.local/share/scrollkeeper`
/// - **macOS**: `~/Library/Application Support/Scrollkeeper`
/// - **Windows**: `%APPDATA%/Scrollkeeper`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        appdata_dir().join("Scrollkeeper")
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR),
            Err(_) => home_dir().join(".local").join("share").join(APP_DIR),
        }
    }
}

fn home_dir() -> PathBuf {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .unwrap_or_else(|_| String::from("/tmp"));
    PathBuf::from(home)
}

#[cfg(target_os = "windows")]
fn appdata_dir() -> PathBuf {
    env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
}
