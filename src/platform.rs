// Platform directories for config, data and cache files.
//
// Linux follows XDG; macOS and Windows use their conventional app folders.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "bookmark-lists";

#[derive(Debug, Clone, Copy)]
enum DirKind {
    Config,
    Data,
    Cache,
}

#[cfg(target_os = "linux")]
fn base_dir(kind: DirKind) -> PathBuf {
    let (xdg_var, fallback): (&str, &[&str]) = match kind {
        DirKind::Config => ("XDG_CONFIG_HOME", &[".config"]),
        DirKind::Data => ("XDG_DATA_HOME", &[".local", "share"]),
        DirKind::Cache => ("XDG_CACHE_HOME", &[".cache"]),
    };
    match env::var(xdg_var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => fallback.iter().fold(home_dir(), |path, part| path.join(part)),
    }
}

#[cfg(target_os = "macos")]
fn base_dir(kind: DirKind) -> PathBuf {
    let library = home_dir().join("Library");
    match kind {
        DirKind::Config | DirKind::Data => library.join("Application Support"),
        DirKind::Cache => library.join("Caches"),
    }
}

#[cfg(target_os = "windows")]
fn base_dir(kind: DirKind) -> PathBuf {
    match kind {
        DirKind::Config | DirKind::Data => PathBuf::from(
            env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
        ),
        DirKind::Cache => PathBuf::from(
            env::var("LOCALAPPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local")),
        )
        .join("cache"),
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn base_dir(kind: DirKind) -> PathBuf {
    let name = match kind {
        DirKind::Config => "config",
        DirKind::Data => "data",
        DirKind::Cache => "cache",
    };
    home_dir().join(format!(".{}", APP_DIR)).join(name)
}

#[allow(dead_code)]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn app_dir(kind: DirKind) -> PathBuf {
    let base = base_dir(kind);
    if cfg!(any(target_os = "linux", target_os = "macos", target_os = "windows")) {
        base.join(APP_DIR)
    } else {
        base
    }
}

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    app_dir(DirKind::Config)
}

/// Directory holding the bookmark database.
pub fn get_data_dir() -> PathBuf {
    app_dir(DirKind::Data)
}

/// Directory for disposable files such as category exports.
pub fn get_cache_dir() -> PathBuf {
    app_dir(DirKind::Cache)
}
