use std::io::Write;
use std::process::{Command, Stdio};

use super::ExportError;

/// Destination for exported text
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ExportError>;
}

/// Writes to the platform clipboard through its command-line helpers
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ExportError> {
        write_clipboard_content(text)
    }
}

/// In-process clipboard, also used when output goes to stdout
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    unavailable: bool,
}

impl MemoryClipboard {
    /// A clipboard that rejects every write
    pub fn unavailable() -> Self {
        Self {
            contents: None,
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ExportError> {
        if self.unavailable {
            return Err(ExportError::ClipboardUnavailable);
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Pipe text into the first helper that accepts it.
///
/// Helpers are tried in order; one that fails to take the text or exits
/// non-zero falls through to the next. If none could be spawned the clipboard
/// is unavailable, otherwise the last failure is reported.
fn pipe_to(candidates: &[(&str, &[&str])], text: &str) -> Result<(), ExportError> {
    let mut last_failure = None;

    for (program, args) in candidates {
        let child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let Ok(mut child) = child else {
            continue;
        };

        // stdin is dropped before waiting so the helper sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait();

        let failure = match (written, status) {
            (Ok(()), Ok(status)) if status.success() => return Ok(()),
            (Err(e), _) => format!("{program}: {e}"),
            (Ok(()), Err(e)) => format!("{program}: {e}"),
            (Ok(()), Ok(status)) => format!("{program}: {status}"),
        };
        tracing::debug!(%failure, "Clipboard helper failed, trying next");
        last_failure = Some(failure);
    }

    match last_failure {
        Some(failure) => Err(ExportError::ClipboardWrite(failure)),
        None => Err(ExportError::ClipboardUnavailable),
    }
}

/// Write text content to system clipboard
fn write_clipboard_content(text: &str) -> Result<(), ExportError> {
    #[cfg(target_os = "macos")]
    {
        pipe_to(&[("pbcopy", &[])], text)
    }

    #[cfg(target_os = "windows")]
    {
        pipe_to(&[("clip", &[])], text)
    }

    #[cfg(target_os = "linux")]
    {
        // Wayland first, then X11 helpers
        pipe_to(
            &[
                ("wl-copy", &[]),
                ("xclip", &["-selection", "clipboard"]),
                ("xsel", &["--clipboard", "--input"]),
            ],
            text,
        )
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = text;
        Err(ExportError::ClipboardUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_helpers_report_unavailable() {
        let result = pipe_to(&[("rich-editor-no-such-clipboard-helper", &[])], "text");
        assert!(matches!(result, Err(ExportError::ClipboardUnavailable)));
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_that_reads_input_succeeds() {
        assert!(pipe_to(&[("cat", &[])], "text").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_helper_falls_through() {
        let failing: (&str, &[&str]) = ("sh", &["-c", "cat > /dev/null; exit 3"]);

        let result = pipe_to(&[failing, ("cat", &[])], "text");
        assert!(result.is_ok());

        let result = pipe_to(&[failing, ("rich-editor-no-such-clipboard-helper", &[])], "text");
        assert!(matches!(result, Err(ExportError::ClipboardWrite(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_exiting_early_is_reaped() {
        // exits without reading; a large payload hits a closed pipe
        let payload = "x".repeat(1 << 20);
        let result = pipe_to(&[("true", &[]), ("cat", &[])], &payload);
        assert!(result.is_ok());
    }

    #[test]
    fn test_memory_clipboard_keeps_last_write() {
        let mut clipboard = MemoryClipboard::default();
        clipboard.write_text("one").unwrap();
        clipboard.write_text("two").unwrap();
        assert_eq!(clipboard.contents(), Some("two"));
    }
}
