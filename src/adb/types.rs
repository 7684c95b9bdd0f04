// Core ADB types shared by the session, registry and command facade
use super::error::{AdbError, AdbResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default port used by `adb tcpip` / `adb connect`.
pub const DEFAULT_TCP_PORT: u16 = 5555;
/// Default host used by `adb connect` / `adb disconnect`.
pub const DEFAULT_TCP_HOST: &str = "localhost";
/// Version of this library.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serial of one connected device, exactly as `adb devices` printed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(serial: &str) -> Self {
        Self(serial.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(serial: String) -> Self {
        Self(serial)
    }
}

/// Whether a subcommand talks to the adb server only, or to one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    /// Runs without a target (version, devices, server control, help, connect).
    Host,
    /// Needs the target ambiguity resolved before dispatch.
    Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebootMode {
    Recovery,
    Bootloader,
}

impl RebootMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            RebootMode::Recovery => "recovery",
            RebootMode::Bootloader => "bootloader",
        }
    }
}

impl FromStr for RebootMode {
    type Err = AdbError;

    fn from_str(s: &str) -> AdbResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recovery" => Ok(RebootMode::Recovery),
            "bootloader" => Ok(RebootMode::Bootloader),
            other => Err(AdbError::bad_call(format!(
                "Unknown reboot mode '{other}', expected 'recovery' or 'bootloader'"
            ))),
        }
    }
}

/// Flags for `adb install [-l] [-r] [-s] <file>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// `-l`: forward-lock the app
    pub forward_lock: bool,
    /// `-r`: reinstall the app, keeping its data
    pub reinstall: bool,
    /// `-s`: install on sdcard instead of internal storage
    pub sdcard: bool,
}

impl InstallOptions {
    pub(crate) fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.forward_lock {
            flags.push("-l");
        }
        if self.reinstall {
            flags.push("-r");
        }
        if self.sdcard {
            flags.push("-s");
        }
        flags
    }
}

/// State of target selection on one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    NoDevicesKnown,
    DevicesKnownUnselected,
    DevicesKnownSelected,
}

/// Outcome of one dispatched command.
///
/// `output` is `None` when the tool printed nothing but whitespace, which is
/// different from a command that legitimately lists zero items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    output: Option<Vec<String>>,
    error: Option<String>,
    exit_code: Option<i32>,
}

impl CommandResult {
    pub(crate) fn new(
        output: Option<Vec<String>>,
        error: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            output,
            error,
            exit_code,
        }
    }

    pub fn output(&self) -> Option<&[String]> {
        self.output.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        self.output.as_deref().unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn into_output(self) -> Option<Vec<String>> {
        self.output
    }

    /// Output lines joined back into one string.
    pub fn output_text(&self) -> Option<String> {
        self.output.as_ref().map(|lines| lines.join("\n"))
    }

    /// True when the command produced only diagnostics.
    pub fn failed(&self) -> bool {
        self.output.is_none() && self.error.is_some()
    }

    /// Turns a failed result, or a non-zero exit, into an error carrying the diagnostic.
    pub fn ensure_success(self, command: &str) -> AdbResult<Self> {
        let non_zero = matches!(self.exit_code, Some(code) if code != 0);
        if self.failed() || non_zero {
            let diagnostic = self
                .error
                .clone()
                .or_else(|| self.output_text())
                .unwrap_or_else(|| format!("exit code {:?}", self.exit_code));
            return Err(AdbError::CommandFailed {
                command: command.to_string(),
                diagnostic,
            });
        }
        Ok(self)
    }
}
