//! Export module for delivering the active document as HTML or Markdown.
//!
//! This module provides:
//! - The `FormatConverter` capability and a built-in HTML to Markdown converter
//! - Clipboard sinks (system clipboard, in-memory buffer)

pub mod clipboard;
pub mod markdown;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use markdown::MarkdownConverter;

/// Target text format for an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "markdown",
        }
    }
}

/// Translates editor markup into an alternate textual representation
pub trait FormatConverter {
    fn convert(&self, markup: &str) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Clipboard is unavailable on this system")]
    ClipboardUnavailable,
    #[error("Failed to write to clipboard: {0}")]
    ClipboardWrite(String),
}

/// Render markup in the requested format
pub fn render(format: ExportFormat, markup: &str, converter: &dyn FormatConverter) -> String {
    match format {
        ExportFormat::Html => markup.to_string(),
        ExportFormat::Markdown => converter.convert(markup),
    }
}

/// Render markup and hand it to the clipboard, returning the exported text
pub fn export_to_clipboard(
    format: ExportFormat,
    markup: &str,
    converter: &dyn FormatConverter,
    clipboard: &mut dyn Clipboard,
) -> Result<String, ExportError> {
    let text = render(format, markup, converter);
    clipboard.write_text(&text)?;
    tracing::info!(format = format.as_str(), bytes = text.len(), "Exported document");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl FormatConverter for Upper {
        fn convert(&self, markup: &str) -> String {
            markup.to_uppercase()
        }
    }

    #[test]
    fn test_html_export_is_verbatim() {
        let mut clipboard = MemoryClipboard::default();
        let text =
            export_to_clipboard(ExportFormat::Html, "<p>hi</p>", &Upper, &mut clipboard).unwrap();
        assert_eq!(text, "<p>hi</p>");
        assert_eq!(clipboard.contents(), Some("<p>hi</p>"));
    }

    #[test]
    fn test_markdown_export_uses_converter() {
        let mut clipboard = MemoryClipboard::default();
        let text =
            export_to_clipboard(ExportFormat::Markdown, "<p>hi</p>", &Upper, &mut clipboard)
                .unwrap();
        assert_eq!(text, "<P>HI</P>");
    }

    #[test]
    fn test_unavailable_clipboard_fails() {
        let mut clipboard = MemoryClipboard::unavailable();
        let result =
            export_to_clipboard(ExportFormat::Html, "<p>hi</p>", &Upper, &mut clipboard);
        assert!(matches!(result, Err(ExportError::ClipboardUnavailable)));
    }
}
