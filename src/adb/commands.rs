// Command facade: one method per adb subcommand, all routed through AdbSession::dispatch
use super::error::{AdbError, AdbResult};
use super::process::ProcessRunner;
use super::session::AdbSession;
use super::types::{CommandResult, CommandScope, InstallOptions, RebootMode};
use std::path::Path;
use std::time::Duration;

// adb reports transfer summaries like "1234 bytes in 0.1s" on stderr
const TRANSFER_SUMMARY_MARKER: &str = "bytes in";
// printed by the device shell when `which` itself is missing
const WHICH_NOT_FOUND: &str = "which: not found";

fn args<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}

fn required<'a>(value: &'a str, what: &str) -> AdbResult<&'a str> {
    if value.trim().is_empty() {
        return Err(AdbError::bad_call(format!("{what} is required")));
    }
    Ok(value)
}

fn local_path<'a>(path: &'a Path, what: &str) -> AdbResult<&'a str> {
    let s = path
        .to_str()
        .ok_or_else(|| AdbError::bad_call(format!("{what} {path:?} is not valid UTF-8")))?;
    required(s, what)
}

/// Moves a transfer summary found on stderr into the output.
fn promote_transfer_summary(result: CommandResult) -> CommandResult {
    match result.error() {
        Some(diag) if diag.contains(TRANSFER_SUMMARY_MARKER) => {
            let mut lines = result.output().map(<[String]>::to_vec).unwrap_or_default();
            lines.extend(diag.lines().map(str::to_string));
            CommandResult::new(Some(lines), None, result.exit_code())
        }
        _ => result,
    }
}

fn mentions_missing_which(text: &str) -> bool {
    text.lines().any(|line| line.trim().ends_with(WHICH_NOT_FOUND))
}

impl<R: ProcessRunner> AdbSession<R> {
    async fn host(&mut self, tokens: Vec<String>) -> AdbResult<CommandResult> {
        self.dispatch(CommandScope::Host, tokens).await
    }

    async fn device(&mut self, tokens: Vec<String>) -> AdbResult<CommandResult> {
        self.dispatch(CommandScope::Device, tokens).await
    }

    // ---- host commands -------------------------------------------------

    /// adb version: returns the version token, e.g. `1.0.41`.
    pub async fn get_version(&mut self) -> AdbResult<String> {
        let result = self.host(args(["version"])).await?;
        result
            .lines()
            .first()
            .and_then(|line| line.split_whitespace().last())
            .map(str::to_string)
            .ok_or_else(|| {
                AdbError::internal(format!(
                    "'adb version' printed no version: {}",
                    result.error().unwrap_or("no output")
                ))
            })
    }

    /// True when the configured tool answers `version`.
    pub async fn check_path(&mut self) -> bool {
        match self.get_version().await {
            Ok(version) => {
                log::debug!("adb version {version}");
                true
            }
            Err(e) => {
                log::debug!("adb path check failed: {e}");
                false
            }
        }
    }

    pub async fn start_server(&mut self) -> AdbResult<CommandResult> {
        self.host(args(["start-server"])).await
    }

    pub async fn kill_server(&mut self) -> AdbResult<CommandResult> {
        self.host(args(["kill-server"])).await
    }

    pub async fn restart_server(&mut self) -> AdbResult<CommandResult> {
        self.kill_server().await?;
        self.start_server().await
    }

    pub async fn get_help(&mut self) -> AdbResult<CommandResult> {
        self.host(args(["help"])).await
    }

    /// adb connect host:port
    pub async fn connect_remote(&mut self, host: &str, port: u16) -> AdbResult<CommandResult> {
        let endpoint = format!("{}:{port}", required(host, "Host")?);
        self.host(vec!["connect".to_string(), endpoint]).await
    }

    /// adb disconnect host:port
    pub async fn disconnect_remote(&mut self, host: &str, port: u16) -> AdbResult<CommandResult> {
        let endpoint = format!("{}:{port}", required(host, "Host")?);
        self.host(vec!["disconnect".to_string(), endpoint]).await
    }

    // ---- device commands -----------------------------------------------

    /// Blocks until the target is online. The tool waits indefinitely; see
    /// [`wait_for_device_timeout`](Self::wait_for_device_timeout) for a bound.
    pub async fn wait_for_device(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["wait-for-device"])).await
    }

    /// `wait-for-device` bounded by `limit`. The child is killed when the limit elapses.
    pub async fn wait_for_device_timeout(&mut self, limit: Duration) -> AdbResult<CommandResult> {
        match tokio::time::timeout(limit, self.wait_for_device()).await {
            Ok(result) => result,
            Err(_) => Err(AdbError::Timeout {
                command: "wait-for-device".to_string(),
                duration: limit,
            }),
        }
    }

    pub async fn get_state(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["get-state"])).await
    }

    pub async fn get_serialno(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["get-serialno"])).await
    }

    pub async fn reboot_device(&mut self, mode: RebootMode) -> AdbResult<CommandResult> {
        self.device(args(["reboot", mode.as_arg()])).await
    }

    /// Like [`reboot_device`](Self::reboot_device) with the mode given by name.
    pub async fn reboot_device_named(&mut self, mode: &str) -> AdbResult<CommandResult> {
        let mode: RebootMode = mode.parse()?;
        self.reboot_device(mode).await
    }

    /// Restarts adbd on the device with root permissions.
    pub async fn set_adb_root(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["root"])).await
    }

    /// Remounts /system read-write.
    pub async fn set_system_rw(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["remount"])).await
    }

    /// adb pull <remote> <local>
    ///
    /// A `bytes in` transfer summary on stderr counts as output, not as an error.
    pub async fn get_remote_file(
        &mut self,
        remote: &str,
        local: impl AsRef<Path>,
    ) -> AdbResult<CommandResult> {
        let remote = required(remote, "Remote path")?;
        let local = local_path(local.as_ref(), "Local path")?;
        let result = self.device(args(["pull", remote, local])).await?;
        Ok(promote_transfer_summary(result))
    }

    /// adb push <local> <remote>
    pub async fn push_local_file(
        &mut self,
        local: impl AsRef<Path>,
        remote: &str,
    ) -> AdbResult<CommandResult> {
        let local = local_path(local.as_ref(), "Local path")?;
        let remote = required(remote, "Remote path")?;
        let result = self.device(args(["push", local, remote])).await?;
        Ok(promote_transfer_summary(result))
    }

    /// adb shell <cmd...>, one token per argument.
    pub async fn shell_command(&mut self, command: &[&str]) -> AdbResult<CommandResult> {
        if command.iter().all(|token| token.trim().is_empty()) {
            return Err(AdbError::bad_call("Shell command is required"));
        }
        let mut tokens = args(["shell"]);
        tokens.extend(args(command.iter().copied()));
        self.device(tokens).await
    }

    /// Restarts adbd listening on USB.
    pub async fn listen_usb(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["usb"])).await
    }

    /// Restarts adbd listening on TCP `port`.
    pub async fn listen_tcp(&mut self, port: u16) -> AdbResult<CommandResult> {
        self.device(vec!["tcpip".to_string(), port.to_string()]).await
    }

    pub async fn get_bugreport(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["bugreport"])).await
    }

    /// Lists PIDs of processes hosting a JDWP transport.
    pub async fn get_jdwp(&mut self) -> AdbResult<CommandResult> {
        self.device(args(["jdwp"])).await
    }

    /// adb logcat [filter...]. Without `-d` among the filters logcat streams
    /// until killed, so callers usually pass `-d` or wrap this in a timeout.
    pub async fn get_logcat(&mut self, filters: &[&str]) -> AdbResult<CommandResult> {
        let mut tokens = args(["logcat"]);
        tokens.extend(args(filters.iter().copied()));
        self.device(tokens).await
    }

    /// adb emu [cmd...]
    pub async fn run_emulator(&mut self, command: &[&str]) -> AdbResult<CommandResult> {
        let mut tokens = args(["emu"]);
        tokens.extend(args(command.iter().copied()));
        self.device(tokens).await
    }

    /// adb ppp <tty> [params...]
    pub async fn ppp_over_usb(&mut self, tty: &str, params: &[&str]) -> AdbResult<CommandResult> {
        let mut tokens = args(["ppp", required(tty, "TTY")?]);
        tokens.extend(args(params.iter().copied()));
        self.device(tokens).await
    }

    /// adb sync [dir]: copy host to device only if changed. `None` syncs all
    /// partitions; a blank directory is rejected.
    pub async fn sync_directory(&mut self, directory: Option<&str>) -> AdbResult<CommandResult> {
        let mut tokens = args(["sync"]);
        if let Some(dir) = directory {
            tokens.push(required(dir, "Sync directory")?.to_string());
        }
        self.device(tokens).await
    }

    /// adb forward <local> <remote>, e.g. `tcp:6100` `tcp:7100`.
    pub async fn forward_socket(&mut self, local: &str, remote: &str) -> AdbResult<CommandResult> {
        let local = required(local, "Local socket")?;
        let remote = required(remote, "Remote socket")?;
        self.device(args(["forward", local, remote])).await
    }

    /// adb uninstall [-k] <package>; `-k` keeps the data and cache directories.
    pub async fn uninstall(&mut self, package: &str, keep_data: bool) -> AdbResult<CommandResult> {
        let package = required(package, "Package name")?;
        let mut tokens = args(["uninstall"]);
        if keep_data {
            tokens.push("-k".to_string());
        }
        tokens.push(package.to_string());
        self.device(tokens).await
    }

    /// adb install [-l] [-r] [-s] <file>
    pub async fn install(
        &mut self,
        package_file: impl AsRef<Path>,
        options: InstallOptions,
    ) -> AdbResult<CommandResult> {
        let file = local_path(package_file.as_ref(), "Package file")?;
        let mut tokens = args(["install"]);
        tokens.extend(args(options.flags()));
        tokens.push(file.to_string());
        self.device(tokens).await
    }

    /// Restores device contents from a backup archive.
    pub async fn restore_file(&mut self, backup: impl AsRef<Path>) -> AdbResult<CommandResult> {
        let file = local_path(backup.as_ref(), "Backup file")?;
        self.device(args(["restore", file])).await
    }

    /// Looks up `name` on the device with `which` and returns its path.
    ///
    /// A binary that is absent is a [`AdbError::BadCall`]; a device without
    /// `which` at all is an [`AdbError::Internal`]. Any other diagnostic with
    /// no output (offline device, closed transport) is a
    /// [`AdbError::CommandFailed`].
    pub async fn find_binary(&mut self, name: &str) -> AdbResult<String> {
        let name = required(name, "Binary name")?;
        let result = self.shell_command(&["which", name]).await?;

        let which_missing = result.lines().iter().any(|l| mentions_missing_which(l))
            || result.error().is_some_and(mentions_missing_which);
        if which_missing {
            return Err(AdbError::internal("which binary not found on device"));
        }
        match (result.lines().first(), result.error()) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(diagnostic)) => Err(AdbError::CommandFailed {
                command: format!("shell which {name}"),
                diagnostic: diagnostic.to_string(),
            }),
            (None, None) => Err(AdbError::bad_call(format!("'{name}' was not found"))),
        }
    }
}
