// Output normalizer: raw child bytes -> trimmed, non-blank lines
use super::error::{AdbError, AdbResult};
use super::process::RawOutput;
use super::types::CommandResult;

/// Decodes `raw` as UTF-8 and returns its non-blank, trimmed lines.
///
/// Returns `Ok(None)` rather than an empty vector when nothing is left.
pub fn normalize_lines(raw: &[u8]) -> AdbResult<Option<Vec<String>>> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        AdbError::internal(format!("adb output is not valid UTF-8: {e}"))
    })?;
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    Ok(if lines.is_empty() { None } else { Some(lines) })
}

/// Same rules as [`normalize_lines`], joined with `\n`.
pub fn normalize_text(raw: &[u8]) -> AdbResult<Option<String>> {
    Ok(normalize_lines(raw)?.map(|lines| lines.join("\n")))
}

impl CommandResult {
    pub fn from_raw(raw: RawOutput) -> AdbResult<Self> {
        Ok(CommandResult::new(
            normalize_lines(&raw.stdout)?,
            normalize_text(&raw.stderr)?,
            raw.exit_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_absent() {
        for raw in ["", "\n", "   \n\t\n", "\r\n\r\n"] {
            assert_eq!(normalize_lines(raw.as_bytes()).unwrap(), None, "{raw:?}");
            assert_eq!(normalize_text(raw.as_bytes()).unwrap(), None, "{raw:?}");
        }
    }

    #[test]
    fn lines_are_trimmed_and_blank_ones_dropped() {
        let raw = b"  first \r\n\n\tsecond\t\n   \nthird";
        assert_eq!(
            normalize_lines(raw).unwrap(),
            Some(vec!["first".to_string(), "second".to_string(), "third".to_string()])
        );
        assert_eq!(
            normalize_text(raw).unwrap(),
            Some("first\nsecond\nthird".to_string())
        );
    }

    #[test]
    fn invalid_utf8_is_internal_error() {
        let err = normalize_lines(&[0x66, 0x6f, 0xff, 0x0a]).unwrap_err();
        assert_eq!(err.kind(), crate::adb::ErrorKind::Internal);
    }

    #[test]
    fn from_raw_keeps_exit_code() {
        let raw = RawOutput {
            stdout: b"List of devices attached\n\n".to_vec(),
            stderr: b"* daemon started successfully\n".to_vec(),
            exit_code: Some(0),
        };
        let result = CommandResult::from_raw(raw).unwrap();
        assert_eq!(result.lines(), ["List of devices attached"]);
        assert_eq!(result.error(), Some("* daemon started successfully"));
        assert_eq!(result.exit_code(), Some(0));
    }
}
