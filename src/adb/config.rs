// Location of the adb binary and per-session policy
use super::error::{AdbError, AdbResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const ADB_PATH_ENV: &str = "ADB_PATH";
pub const ADB_AUTO_SELECT_ENV: &str = "ADB_AUTO_SELECT";

#[cfg(windows)]
const ADB_BINARY_NAME: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_BINARY_NAME: &str = "adb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// Absolute path of the adb binary. Commands fail until this is set.
    pub adb_path: Option<PathBuf>,
    /// When exactly one device is known and none is selected, direct
    /// device-scoped commands at it instead of failing.
    pub auto_select_single_device: bool,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            auto_select_single_device: true,
        }
    }
}

impl AdbConfig {
    /// Config with a validated tool path and default policy.
    pub fn with_adb_path(path: impl AsRef<Path>) -> AdbResult<Self> {
        Ok(Self {
            adb_path: Some(validate_tool_path(path)?),
            ..Self::default()
        })
    }

    /// Builds a config from `ADB_PATH` / `ADB_AUTO_SELECT`, falling back to
    /// the first `adb` found on `PATH`.
    pub fn from_env() -> AdbResult<Self> {
        let adb_path = match env::var_os(ADB_PATH_ENV) {
            Some(raw) if !raw.is_empty() => Some(validate_tool_path(PathBuf::from(raw))?),
            _ => locate_on_path(),
        };
        let auto_select_single_device = env::var(ADB_AUTO_SELECT_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(true);
        if adb_path.is_none() {
            log::warn!("No adb binary found via {ADB_PATH_ENV} or PATH");
        }
        Ok(Self {
            adb_path,
            auto_select_single_device,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Expands a leading `~` to the current user's home directory.
pub fn expand_home(path: &Path) -> AdbResult<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = homedir::my_home()
        .ok()
        .flatten()
        .ok_or_else(|| AdbError::InvalidToolPath {
            path: path.to_path_buf(),
            reason: "could not determine home directory to expand '~'".to_string(),
        })?;
    Ok(home.join(rest))
}

/// Checks that `path` names an existing, executable file and returns the
/// expanded path.
pub fn validate_tool_path(path: impl AsRef<Path>) -> AdbResult<PathBuf> {
    let path = expand_home(path.as_ref())?;
    let invalid = |reason: &str| AdbError::InvalidToolPath {
        path: path.clone(),
        reason: reason.to_string(),
    };
    if path.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    let metadata = std::fs::metadata(&path).map_err(|e| invalid(&e.to_string()))?;
    if !metadata.is_file() {
        return Err(invalid("not a regular file"));
    }
    if !is_executable(&metadata) {
        return Err(invalid("file is not executable"));
    }
    Ok(path)
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// First executable `adb` on `PATH`, if any.
pub fn locate_on_path() -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(ADB_BINARY_NAME))
        .find(|candidate| validate_tool_path(candidate).is_ok())
}
