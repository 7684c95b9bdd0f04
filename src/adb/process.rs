// Process invoker: the only place that spawns the adb binary
use super::error::{AdbError, AdbResult};
use super::types::DeviceId;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Fully resolved command line for one adb run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// `[tool] + ["-s", target]? + tokens`
    pub fn build(tool: &Path, target: Option<&DeviceId>, tokens: &[String]) -> Self {
        let mut args = Vec::with_capacity(tokens.len() + 2);
        if let Some(target) = target {
            args.push("-s".to_string());
            args.push(target.as_str().to_string());
        }
        args.extend(tokens.iter().cloned());
        Self {
            program: tool.to_path_buf(),
            args,
        }
    }

    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Human readable command line for logs and error messages.
    pub fn display(&self) -> String {
        self.argv().join(" ")
    }
}

/// Raw bytes and status collected from a finished child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

// Seam between the session and the OS so dispatch logic can be tested
// without a real adb binary.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> AdbResult<RawOutput>;
}

/// Runs adb as a real child process via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

impl ProcessRunner for TokioRunner {
    async fn run(&self, invocation: &Invocation) -> AdbResult<RawOutput> {
        log::debug!("Running: {}", invocation.display());
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AdbError::SpawnFailed {
                program: invocation.program.to_string_lossy().into_owned(),
                source,
            })?;

        let Some(code) = output.status.code() else {
            let description = describe_abnormal_exit(&output.status);
            log::warn!("{} {}", invocation.display(), description);
            return Err(AdbError::AbnormalExit {
                command: invocation.display(),
                description,
            });
        };
        log::debug!(
            "Finished with exit code {code} ({} bytes stdout, {} bytes stderr)",
            output.stdout.len(),
            output.stderr.len()
        );
        Ok(RawOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: Some(code),
        })
    }
}

#[cfg(unix)]
fn describe_abnormal_exit(status: &std::process::ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => format!("killed by signal {signal}"),
        None => format!("exited without a status code ({status})"),
    }
}

#[cfg(not(unix))]
fn describe_abnormal_exit(status: &std::process::ExitStatus) -> String {
    format!("exited without a status code ({status})")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn argv_with_target() {
        let target = DeviceId::from("DEV1");
        let inv = Invocation::build(Path::new("/bin/tool"), Some(&target), &tokens(&["shell", "ls"]));
        assert_eq!(inv.argv(), vec!["/bin/tool", "-s", "DEV1", "shell", "ls"]);
    }

    #[test]
    fn argv_without_target() {
        let inv = Invocation::build(Path::new("/bin/tool"), None, &tokens(&["version"]));
        assert_eq!(inv.argv(), vec!["/bin/tool", "version"]);
        assert_eq!(inv.display(), "/bin/tool version");
    }

    #[test]
    fn tokens_are_not_split_or_quoted() {
        let inv = Invocation::build(
            Path::new("/bin/tool"),
            None,
            &tokens(&["pull", "/sdcard/My Photos/a b.jpg", "out dir/x;rm -rf"]),
        );
        assert_eq!(inv.args.len(), 3);
        assert_eq!(inv.args[1], "/sdcard/My Photos/a b.jpg");
        assert_eq!(inv.args[2], "out dir/x;rm -rf");
    }

    #[tokio::test]
    async fn spawn_failure_is_execution_error() {
        let inv = Invocation::build(Path::new("/definitely/not/here/adb"), None, &tokens(&["version"]));
        let err = TokioRunner.run(&inv).await.unwrap_err();
        assert_eq!(err.kind(), crate::adb::ErrorKind::Execution);
        assert!(matches!(err, AdbError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let inv = Invocation {
            program: PathBuf::from("/bin/sh"),
            args: tokens(&["-c", "echo out; echo err 1>&2; exit 3"]),
        };
        let raw = TokioRunner.run(&inv).await.unwrap();
        assert_eq!(raw.stdout, b"out\n");
        assert_eq!(raw.stderr, b"err\n");
        assert_eq!(raw.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdin_is_closed() {
        // `cat` would block forever on an open stdin
        let inv = Invocation {
            program: PathBuf::from("/bin/sh"),
            args: tokens(&["-c", "cat; echo done"]),
        };
        let raw = tokio::time::timeout(std::time::Duration::from_secs(5), TokioRunner.run(&inv))
            .await
            .expect("child should not wait on stdin")
            .unwrap();
        assert_eq!(raw.stdout, b"done\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn killed_child_is_abnormal_exit() {
        let inv = Invocation {
            program: PathBuf::from("/bin/sh"),
            args: tokens(&["-c", "kill -9 $$"]),
        };
        let err = TokioRunner.run(&inv).await.unwrap_err();
        assert!(matches!(err, AdbError::AbnormalExit { .. }));
        assert!(err.to_string().contains("signal 9"));
    }
}
