// One adb session: config, device registry and the single dispatch path
use super::config::{AdbConfig, validate_tool_path};
use super::error::{AdbError, AdbResult};
use super::process::{Invocation, ProcessRunner, TokioRunner};
use super::registry::{DeviceRegistry, is_permission_diagnostic, parse_devices};
use super::types::{CommandResult, CommandScope, DeviceId, TargetState};
use std::path::Path;

/// Client for one adb tool installation.
///
/// All state (tool path, known devices, selected target) lives here, so
/// independent sessions never observe each other. Every command takes
/// `&mut self` and runs to completion before returning.
#[derive(Debug)]
pub struct AdbSession<R: ProcessRunner = TokioRunner> {
    config: AdbConfig,
    registry: DeviceRegistry,
    runner: R,
}

impl AdbSession<TokioRunner> {
    pub fn new(config: AdbConfig) -> Self {
        Self::with_runner(config, TokioRunner)
    }

    /// Session configured from `ADB_PATH` / `ADB_AUTO_SELECT` / `PATH`.
    pub fn from_env() -> AdbResult<Self> {
        Ok(Self::new(AdbConfig::from_env()?))
    }
}

impl<R: ProcessRunner> AdbSession<R> {
    pub fn with_runner(config: AdbConfig, runner: R) -> Self {
        Self {
            config,
            registry: DeviceRegistry::new(),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config(&self) -> &AdbConfig {
        &self.config
    }

    /// Validates and stores a new adb path (a leading `~` is expanded).
    pub fn set_adb_path(&mut self, path: impl AsRef<Path>) -> AdbResult<()> {
        let path = validate_tool_path(path)?;
        log::debug!("Using adb at {}", path.display());
        self.config.adb_path = Some(path);
        Ok(())
    }

    pub fn get_adb_path(&self) -> Option<&Path> {
        self.config.adb_path.as_deref()
    }

    pub fn set_auto_select_single_device(&mut self, enabled: bool) {
        self.config.auto_select_single_device = enabled;
    }

    /// Devices found by the last [`discover_devices`](Self::discover_devices), if any ran.
    pub fn devices(&self) -> Option<&[DeviceId]> {
        self.registry.devices()
    }

    pub fn target_state(&self) -> TargetState {
        self.registry.state()
    }

    pub fn current_target(&self) -> Option<&DeviceId> {
        self.registry.current_target()
    }

    /// Selects the device that device-scoped commands are sent to. The id
    /// must come from the most recent discovery.
    pub fn select_target(&mut self, id: impl Into<DeviceId>) -> AdbResult<()> {
        let id = id.into();
        self.registry.select(&id)?;
        log::info!("Selected target device {id}");
        Ok(())
    }

    /// Runs `adb devices` and replaces the registry with the result.
    ///
    /// Any previous selection is dropped and has to be made again.
    pub async fn discover_devices(&mut self) -> AdbResult<Vec<DeviceId>> {
        let result = self.dispatch(CommandScope::Host, vec!["devices".to_string()]).await?;
        let lines = match (result.output(), result.error()) {
            (Some(lines), _) => lines,
            (None, Some(diagnostic)) if is_permission_diagnostic(diagnostic) => {
                return Err(AdbError::Permissions {
                    diagnostic: diagnostic.to_string(),
                });
            }
            (None, Some(diagnostic)) => {
                return Err(AdbError::CommandFailed {
                    command: "devices".to_string(),
                    diagnostic: diagnostic.to_string(),
                });
            }
            (None, None) => return Err(AdbError::internal("'adb devices' produced no output")),
        };
        let devices = parse_devices(lines)?;
        log::info!("Discovered {} device(s): {:?}", devices.len(), devices);
        self.registry.replace(devices.clone());
        Ok(devices)
    }

    /// Builds the command line a command of `scope` would run with right now.
    ///
    /// Fails before anything is spawned when the tool path is unset or the
    /// target is ambiguous.
    pub fn build_invocation(&self, scope: CommandScope, tokens: &[String]) -> AdbResult<Invocation> {
        let tool = self.config.adb_path.as_deref().ok_or(AdbError::ToolPathUnset)?;
        let target = self
            .registry
            .resolve(scope, self.config.auto_select_single_device)?;
        Ok(Invocation::build(tool, target.as_ref(), tokens))
    }

    /// The one path every command goes through.
    pub(crate) async fn dispatch(
        &mut self,
        scope: CommandScope,
        tokens: Vec<String>,
    ) -> AdbResult<CommandResult> {
        let invocation = self.build_invocation(scope, &tokens)?;
        let raw = self.runner.run(&invocation).await?;
        let result = CommandResult::from_raw(raw)?;
        if let Some(code) = result.exit_code().filter(|code| *code != 0) {
            log::debug!("'{}' exited with {code}", invocation.display());
        }
        Ok(result)
    }
}
