//! Wallet daemon location and invocation
//!
//! Pure functions of platform + shell executable path. No filesystem or
//! network access happens here; existence checks belong to the spawn path.

use std::path::{Path, PathBuf};

/// File name of the bundled wallet daemon (without the Windows extension)
pub const DAEMON_BINARY: &str = "walletd";

/// Host platform identifier, matching the installer's packaging layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Win32,
    Linux,
    Other,
}

impl Platform {
    /// Platform the shell was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// All supported packaging layouts, for exhaustive tests
    pub fn all() -> [Platform; 4] {
        [
            Platform::Darwin,
            Platform::Win32,
            Platform::Linux,
            Platform::Other,
        ]
    }
}

/// A fully resolved daemon invocation: executable plus fixed argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonInvocation {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

impl DaemonInvocation {
    /// Resolve the invocation for `platform`, given the shell's own
    /// executable path. The GUI static-asset directory is colocated with the
    /// daemon binary.
    pub fn resolve(platform: Platform, shell_exe: &Path) -> Self {
        Self::for_executable(daemon_executable(platform, shell_exe))
    }

    /// Build the invocation for an explicit daemon executable (development
    /// override); the GUI directory stays colocated with the binary.
    pub fn for_executable(executable: PathBuf) -> Self {
        let gui_dir = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            args: daemon_args(&gui_dir),
            executable,
        }
    }
}

/// Compute the daemon executable path for the given packaging layout
pub fn daemon_executable(platform: Platform, shell_exe: &Path) -> PathBuf {
    match platform {
        // App bundle: Contents/MacOS/<shell> → Contents/Resources/app/walletd
        Platform::Darwin => shell_exe.join("../../Resources/app").join(DAEMON_BINARY),
        // Relative path only, due to short path length limits
        Platform::Win32 => PathBuf::from("./resources/app/walletd.exe"),
        Platform::Linux => shell_exe
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("resources/app")
            .join(DAEMON_BINARY),
        Platform::Other => PathBuf::from("./resources/app").join(DAEMON_BINARY),
    }
}

/// Fixed daemon argument vector. No flag here is user-configurable.
pub fn daemon_args(gui_dir: &Path) -> Vec<String> {
    vec![
        "-launch-browser=false".to_string(),
        format!("-gui-dir={}", gui_dir.display()),
        "-color-log=false".to_string(), // must stay off for web interface detection
        "-logtofile=true".to_string(),
        "-download-peerlist=true".to_string(),
        "-enable-all-api-sets=true".to_string(),
        "-enable-api-sets=INSECURE_WALLET_SEED".to_string(),
        "-disable-csrf=false".to_string(),
        "-reset-corrupt-db=true".to_string(),
        "-enable-gui=true".to_string(),
        // random port assignment, never a fixed port
        "-web-interface-port=0".to_string(),
    ]
}
