use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "showcase";

/// Resolve and create the log directory
///
/// Resolution order:
/// 1. Custom directory from parameter (if provided)
/// 2. `/var/log/showcase` when writable (Linux services)
/// 3. The platform's local data directory
/// 4. Temp directory as last resort
pub fn get_log_directory(custom_dir: Option<&str>) -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = custom_dir {
        return ensure_directory_exists(PathBuf::from(dir));
    }

    ensure_directory_exists(default_log_dir())
}

fn default_log_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        let system_dir = PathBuf::from("/var/log").join(APP_DIR);
        if is_writable(&system_dir) {
            return system_dir;
        }
    }

    if cfg!(target_os = "macos") {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library").join("Logs").join("Showcase");
        }
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join(APP_DIR).join("logs");
    }

    env::temp_dir().join("showcase_logs")
}

/// Check if a directory exists and accepts new files
fn is_writable(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }

    let probe = path.join(".write_test");
    let writable = fs::write(&probe, b"probe").is_ok();
    let _ = fs::remove_file(&probe);
    writable
}

fn ensure_directory_exists(path: PathBuf) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(&path)?;
    Ok(path)
}
