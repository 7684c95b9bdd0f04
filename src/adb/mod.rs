// ADB module - typed client for the external `adb` command-line tool.
// Commands are built as token lists, run through a single dispatch path and
// their output normalized into CommandResult values.

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod process;
pub mod registry;
pub mod session;
pub mod types;


// Re-export the main types and functions for easy access
pub use config::AdbConfig;
pub use error::{AdbError, AdbResult, ErrorKind};
pub use output::{normalize_lines, normalize_text};
pub use process::{Invocation, ProcessRunner, RawOutput, TokioRunner};
pub use registry::{DeviceRegistry, parse_devices};
pub use session::AdbSession;
pub use types::{
    CommandResult, CommandScope, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT, DeviceId, InstallOptions,
    LIBRARY_VERSION, RebootMode, TargetState,
};
