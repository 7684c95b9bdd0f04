pub mod adb;

pub use adb::{AdbConfig, AdbError, AdbResult, AdbSession, CommandResult, DeviceId, RebootMode};
