// Known devices and the currently selected target
use super::error::{AdbError, AdbResult};
use super::types::{CommandScope, DeviceId, TargetState};

const DEVICES_HEADER: &str = "List of devices attached";
const PERMISSION_MARKERS: [&str; 2] = ["no permissions", "insufficient permissions"];

/// Devices seen by the last discovery plus the selected target.
///
/// A selection never outlives the device list it was picked from.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Option<Vec<DeviceId>>,
    target: Option<DeviceId>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn devices(&self) -> Option<&[DeviceId]> {
        self.devices.as_deref()
    }

    pub fn current_target(&self) -> Option<&DeviceId> {
        self.target.as_ref()
    }

    pub fn state(&self) -> TargetState {
        match (&self.devices, &self.target) {
            (_, Some(_)) => TargetState::DevicesKnownSelected,
            (Some(devices), None) if !devices.is_empty() => TargetState::DevicesKnownUnselected,
            _ => TargetState::NoDevicesKnown,
        }
    }

    /// Replaces the device list wholesale and drops the selection.
    pub fn replace(&mut self, devices: Vec<DeviceId>) {
        if let Some(old) = self.target.take() {
            log::debug!("Device list refreshed, clearing selection of {old}");
        }
        self.devices = Some(devices);
    }

    pub fn select(&mut self, id: &DeviceId) -> AdbResult<()> {
        if id.as_str().trim().is_empty() {
            return Err(AdbError::bad_call("Device id must not be empty"));
        }
        let Some(devices) = &self.devices else {
            return Err(AdbError::bad_call("Must get device list first"));
        };
        if !devices.contains(id) {
            return Err(AdbError::bad_call(format!(
                "Device '{id}' is not in the current device list"
            )));
        }
        self.target = Some(id.clone());
        Ok(())
    }

    /// Target to pass as `-s` for a command of the given scope.
    pub fn resolve(&self, scope: CommandScope, auto_select_single: bool) -> AdbResult<Option<DeviceId>> {
        if scope == CommandScope::Host {
            return Ok(None);
        }
        if let Some(target) = &self.target {
            return Ok(Some(target.clone()));
        }
        match self.devices.as_deref() {
            None => Err(AdbError::bad_call(
                "Must get device list and select a target device first",
            )),
            Some([]) => Err(AdbError::bad_call("No devices attached")),
            Some([only]) if auto_select_single => Ok(Some(only.clone())),
            Some(devices) => Err(AdbError::bad_call(format!(
                "Must set target device first ({} devices attached)",
                devices.len()
            ))),
        }
    }
}

pub(crate) fn is_permission_diagnostic(text: &str) -> bool {
    PERMISSION_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Parses normalized `adb devices` output into device ids.
///
/// Leading daemon notices (`* daemon ...`) are skipped, then the header, then
/// the first token of every remaining line is taken as the serial.
pub fn parse_devices(lines: &[String]) -> AdbResult<Vec<DeviceId>> {
    if let Some(line) = lines.iter().find(|line| is_permission_diagnostic(line)) {
        log::warn!("adb cannot access device: {line}");
        return Err(AdbError::Permissions {
            diagnostic: line.clone(),
        });
    }

    let mut rest = lines.iter().skip_while(|line| line.starts_with('*'));
    match rest.next() {
        Some(header) if header.starts_with(DEVICES_HEADER) => {}
        Some(other) => {
            return Err(AdbError::internal(format!(
                "Unexpected 'adb devices' header: {other}"
            )));
        }
        None => return Err(AdbError::internal("'adb devices' produced no header")),
    }

    rest.map(|line| {
        line.split_whitespace()
            .next()
            .map(DeviceId::from)
            .ok_or_else(|| AdbError::internal(format!("Malformed device line: {line:?}")))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::ErrorKind;

    fn lines(raw: &str) -> Vec<String> {
        raw.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn ids(list: &[&str]) -> Vec<DeviceId> {
        list.iter().map(|s| DeviceId::from(*s)).collect()
    }

    #[test]
    fn parse_devices_basic() {
        let devs = parse_devices(&lines("List of devices attached\nABC123\tdevice\n")).unwrap();
        assert_eq!(devs, ids(&["ABC123"]));
    }

    #[test]
    fn parse_devices_multiple_long_format() {
        let adb_output = "List of devices attached\n1d36d8f1               device usb:1-4 product:OnePlus6 model:ONEPLUS_A6000 device:OnePlus6 transport_id:2\noneplus6:5555          device product:OnePlus6 model:ONEPLUS_A6000 device:OnePlus6 transport_id:3\n";
        let devs = parse_devices(&lines(adb_output)).unwrap();
        assert_eq!(devs, ids(&["1d36d8f1", "oneplus6:5555"]));
    }

    #[test]
    fn parse_devices_keeps_offline_and_unauthorized() {
        let adb_output = "List of devices attached\nemulator-5554\toffline\nR58M\tunauthorized\n";
        let devs = parse_devices(&lines(adb_output)).unwrap();
        assert_eq!(devs, ids(&["emulator-5554", "R58M"]));
    }

    #[test]
    fn parse_devices_empty_list() {
        let devs = parse_devices(&lines("List of devices attached\n\n")).unwrap();
        assert!(devs.is_empty());
    }

    #[test]
    fn parse_devices_skips_daemon_notices() {
        let adb_output = "* daemon not running; starting now at tcp:5037\n* daemon started successfully\nList of devices attached\nABC123\tdevice\n";
        let devs = parse_devices(&lines(adb_output)).unwrap();
        assert_eq!(devs, ids(&["ABC123"]));
    }

    #[test]
    fn parse_devices_detects_permissions() {
        let old = "List of devices attached\n????????????\tno permissions\n";
        let err = parse_devices(&lines(old)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permissions);

        let new = "List of devices attached\n0123456789ABCDEF\tno permissions (user in plugdev group; are your udev rules wrong?); see [http://developer.android.com/tools/device.html]\n";
        let err = parse_devices(&lines(new)).unwrap_err();
        assert!(err.to_string().contains("udev rules"));
    }

    #[test]
    fn parse_devices_rejects_unknown_header() {
        let err = parse_devices(&lines("adb: usage: unknown command\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err = parse_devices(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn state_transitions() {
        let mut reg = DeviceRegistry::new();
        assert_eq!(reg.state(), TargetState::NoDevicesKnown);

        reg.replace(ids(&["A", "B"]));
        assert_eq!(reg.state(), TargetState::DevicesKnownUnselected);

        reg.select(&DeviceId::from("B")).unwrap();
        assert_eq!(reg.state(), TargetState::DevicesKnownSelected);
        assert_eq!(reg.current_target(), Some(&DeviceId::from("B")));

        reg.select(&DeviceId::from("A")).unwrap();
        assert_eq!(reg.current_target(), Some(&DeviceId::from("A")));

        reg.replace(ids(&["A"]));
        assert_eq!(reg.state(), TargetState::DevicesKnownUnselected);
        assert_eq!(reg.current_target(), None);

        reg.replace(Vec::new());
        assert_eq!(reg.state(), TargetState::NoDevicesKnown);
    }

    #[test]
    fn select_requires_discovery_and_membership() {
        let mut reg = DeviceRegistry::new();
        assert!(reg.select(&DeviceId::from("A")).unwrap_err().is_bad_call());

        reg.replace(ids(&["A", "B"]));
        assert!(reg.select(&DeviceId::from("")).unwrap_err().is_bad_call());
        assert!(reg.select(&DeviceId::from("a")).unwrap_err().is_bad_call());

        reg.replace(ids(&["C"]));
        assert!(reg.select(&DeviceId::from("A")).unwrap_err().is_bad_call());
        assert!(reg.select(&DeviceId::from("C")).is_ok());
    }

    #[test]
    fn resolve_policy() {
        let mut reg = DeviceRegistry::new();
        assert_eq!(reg.resolve(CommandScope::Host, true).unwrap(), None);
        assert!(reg.resolve(CommandScope::Device, true).unwrap_err().is_bad_call());

        reg.replace(Vec::new());
        assert!(reg.resolve(CommandScope::Device, true).unwrap_err().is_bad_call());

        reg.replace(ids(&["ONLY"]));
        assert_eq!(
            reg.resolve(CommandScope::Device, true).unwrap(),
            Some(DeviceId::from("ONLY"))
        );
        assert!(reg.resolve(CommandScope::Device, false).unwrap_err().is_bad_call());

        reg.replace(ids(&["A", "B"]));
        assert!(reg.resolve(CommandScope::Device, true).unwrap_err().is_bad_call());
        reg.select(&DeviceId::from("B")).unwrap();
        assert_eq!(
            reg.resolve(CommandScope::Device, false).unwrap(),
            Some(DeviceId::from("B"))
        );
        assert_eq!(reg.resolve(CommandScope::Host, false).unwrap(), None);
    }
}
