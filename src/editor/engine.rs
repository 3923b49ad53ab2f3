use crate::docs::EMPTY_CONTENT;

/// Change notification raised by a rich text engine after its content mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub markup: String,
}

/// The editing surface the session drives.
///
/// Engines report mutations by returning a [`ContentChange`]; the session forwards
/// every change into the document store.
pub trait RichTextEngine {
    /// Current content as serialized markup
    fn content(&self) -> String;

    /// Replace the content wholesale. With `emit_update == false` no change is
    /// reported, so loading a document does not echo back into the store.
    fn set_content(&mut self, markup: &str, emit_update: bool) -> Option<ContentChange>;

    /// Insert plain text at the end of the document
    fn insert_content(&mut self, text: &str) -> ContentChange;
}

/// Minimal in-memory engine holding the markup string
#[derive(Debug, Clone)]
pub struct HtmlBuffer {
    markup: String,
}

impl Default for HtmlBuffer {
    fn default() -> Self {
        Self {
            markup: EMPTY_CONTENT.to_string(),
        }
    }
}

impl HtmlBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn change(&self) -> ContentChange {
        ContentChange {
            markup: self.markup.clone(),
        }
    }
}

impl RichTextEngine for HtmlBuffer {
    fn content(&self) -> String {
        self.markup.clone()
    }

    fn set_content(&mut self, markup: &str, emit_update: bool) -> Option<ContentChange> {
        self.markup = if markup.is_empty() {
            EMPTY_CONTENT.to_string()
        } else {
            markup.to_string()
        };
        emit_update.then(|| self.change())
    }

    fn insert_content(&mut self, text: &str) -> ContentChange {
        let paragraphs: String = text
            .lines()
            .map(|line| {
                if line.is_empty() {
                    EMPTY_CONTENT.to_string()
                } else {
                    format!("<p>{}</p>", escape_html(line))
                }
            })
            .collect();

        if self.markup.trim().is_empty() || self.markup == EMPTY_CONTENT {
            self.markup = paragraphs;
        } else {
            self.markup.push_str(&paragraphs);
        }
        self.change()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_content_emits_only_when_asked() {
        let mut engine = HtmlBuffer::new();
        assert_eq!(engine.set_content("<p>a</p>", false), None);
        assert_eq!(engine.content(), "<p>a</p>");

        let change = engine.set_content("<p>b</p>", true).unwrap();
        assert_eq!(change.markup, "<p>b</p>");
    }

    #[test]
    fn test_empty_content_normalized() {
        let mut engine = HtmlBuffer::new();
        engine.set_content("", false);
        assert_eq!(engine.content(), EMPTY_CONTENT);
    }

    #[test]
    fn test_insert_replaces_empty_document() {
        let mut engine = HtmlBuffer::new();
        let change = engine.insert_content("Outline:\n- Context");
        assert_eq!(change.markup, "<p>Outline:</p><p>- Context</p>");
    }

    #[test]
    fn test_insert_appends_and_escapes() {
        let mut engine = HtmlBuffer::new();
        engine.set_content("<h2>Doc</h2>", false);
        engine.insert_content("a < b & c");
        assert_eq!(engine.content(), "<h2>Doc</h2><p>a &lt; b &amp; c</p>");
    }
}
