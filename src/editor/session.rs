use tracing::{debug, info};

use super::engine::{ContentChange, RichTextEngine};
use super::templates::{find_prompt, find_template, Locale, Prompt, Template};
use crate::database::KeyValueSlot;
use crate::docs::{Document, DocumentStore, UpdateDocumentInput};
use crate::export::{export_to_clipboard, Clipboard, ExportError, ExportFormat, FormatConverter};

/// Binds a document store to a rich text engine.
///
/// Keeps the engine showing the active document, forwards engine changes into
/// the store and re-selects the first document whenever the active pointer
/// dangles.
pub struct EditorSession<S: KeyValueSlot, E: RichTextEngine> {
    store: DocumentStore<S>,
    engine: E,
    locale: Locale,
    rendered_id: Option<String>,
}

impl<S: KeyValueSlot, E: RichTextEngine> EditorSession<S, E> {
    pub fn new(store: DocumentStore<S>, engine: E, locale: Locale) -> Self {
        let mut session = EditorSession {
            store,
            engine,
            locale,
            rendered_id: None,
        };
        session.sync();
        session
    }

    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access for input handling; call
    /// [`EditorSession::on_engine_change`] after mutating it
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn active_doc(&self) -> Option<&Document> {
        self.store.active_doc()
    }

    fn repair_active(&mut self) {
        if self.store.state().active_is_valid() {
            return;
        }
        if let Some(first) = self.store.docs().first().map(|d| d.id.clone()) {
            debug!(doc_id = %first, "Active document missing, selecting first");
            self.store.set_active(&first);
        }
    }

    /// Push the active document into the engine if it is not already displayed
    fn render_active(&mut self) {
        let Some(doc) = self.store.active_doc() else {
            return;
        };
        if self.rendered_id.as_deref() == Some(doc.id.as_str()) {
            return;
        }

        let id = doc.id.clone();
        let content = doc.content.clone();
        self.engine.set_content(&content, false);
        self.rendered_id = Some(id);
    }

    fn sync(&mut self) {
        self.repair_active();
        self.render_active();
    }

    fn forward(&mut self, change: Option<ContentChange>) {
        let Some(change) = change else {
            return;
        };
        if let Some(id) = self.store.active_id().map(str::to_string) {
            self.store
                .update_doc(&id, UpdateDocumentInput::content(change.markup));
        }
    }

    /// Handle a change notification raised by the engine
    pub fn on_engine_change(&mut self) {
        let markup = self.engine.content();
        self.forward(Some(ContentChange { markup }));
    }

    pub fn select(&mut self, id: &str) {
        self.store.set_active(id);
        self.sync();
    }

    pub fn create(&mut self, title: Option<&str>) -> String {
        let id = self.store.create_doc(title);
        self.sync();
        id
    }

    pub fn delete(&mut self, id: &str) {
        self.store.delete_doc(id);
        self.sync();
    }

    pub fn rename(&mut self, title: &str) {
        if let Some(id) = self.store.active_id().map(str::to_string) {
            self.store.update_doc(&id, UpdateDocumentInput::title(title));
        }
        self.sync();
    }

    /// Replace the body through the engine, as a user edit would
    pub fn edit(&mut self, markup: &str) {
        let change = self.engine.set_content(markup, true);
        self.forward(change);
        self.sync();
    }

    pub fn save_version(&mut self) -> Option<String> {
        let id = self.store.active_id()?.to_string();
        self.store.save_version(&id)
    }

    /// Restore a snapshot of the active document and show it in the engine
    pub fn restore_version(&mut self, version_id: &str) -> bool {
        let Some(id) = self.store.active_id().map(str::to_string) else {
            return false;
        };
        let restored = self.store.restore_version(&id, version_id);
        if restored {
            self.rendered_id = None;
        }
        self.sync();
        restored
    }

    /// Drop every document and show the fresh welcome document
    pub fn reset(&mut self) {
        self.store.reset();
        self.rendered_id = None;
        self.sync();
    }

    /// Replace the active document's title and content with a template
    pub fn apply_template(&mut self, key: &str) -> Option<&'static Template> {
        let template = find_template(self.locale, key)?;
        let id = self.store.active_id()?.to_string();

        self.store.update_doc(
            &id,
            UpdateDocumentInput {
                title: Some(template.title.to_string()),
                content: Some(template.content.to_string()),
            },
        );
        self.engine.set_content(template.content, false);
        self.rendered_id = Some(id);
        info!(template = key, "Applied template");
        Some(template)
    }

    /// Insert a prompt into the engine; the resulting change is stored
    pub fn insert_prompt(&mut self, key: &str) -> Option<&'static Prompt> {
        let prompt = find_prompt(self.locale, key)?;
        self.store.active_id()?;

        let change = self.engine.insert_content(prompt.content);
        self.forward(Some(change));
        info!(prompt = key, "Inserted prompt");
        Some(prompt)
    }

    /// Documents whose title contains the query, ignoring case
    pub fn search(&self, query: &str) -> Vec<&Document> {
        let query = query.trim().to_lowercase();
        self.store
            .docs()
            .iter()
            .filter(|doc| query.is_empty() || doc.title.to_lowercase().contains(&query))
            .collect()
    }

    /// Export what the engine currently shows
    pub fn export(
        &self,
        format: ExportFormat,
        converter: &dyn FormatConverter,
        clipboard: &mut dyn Clipboard,
    ) -> Result<String, ExportError> {
        export_to_clipboard(format, &self.engine.content(), converter, clipboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::docs::{EMPTY_CONTENT, SAMPLE_CONTENT};
    use crate::editor::engine::HtmlBuffer;
    use crate::export::{MarkdownConverter, MemoryClipboard};
    use std::sync::Arc;

    /// Engine that counts how often it announced a change
    #[derive(Default)]
    struct CountingEngine {
        inner: HtmlBuffer,
        emitted: usize,
    }

    impl RichTextEngine for CountingEngine {
        fn content(&self) -> String {
            self.inner.content()
        }

        fn set_content(&mut self, markup: &str, emit_update: bool) -> Option<ContentChange> {
            let change = self.inner.set_content(markup, emit_update);
            if change.is_some() {
                self.emitted += 1;
            }
            change
        }

        fn insert_content(&mut self, text: &str) -> ContentChange {
            self.emitted += 1;
            self.inner.insert_content(text)
        }
    }

    fn session() -> EditorSession<Database, HtmlBuffer> {
        let store = DocumentStore::load(Database::in_memory().unwrap());
        EditorSession::new(store, HtmlBuffer::new(), Locale::En)
    }

    #[test]
    fn test_new_session_renders_active_doc() {
        let session = session();
        assert_eq!(session.engine().content(), SAMPLE_CONTENT);
    }

    #[test]
    fn test_dangling_active_is_repaired() {
        let mut store = DocumentStore::load(Database::in_memory().unwrap());
        store.create_doc(Some("Second"));
        store.set_active("gone");

        let session = EditorSession::new(store, HtmlBuffer::new(), Locale::En);
        let first = session.store().docs()[0].id.clone();
        assert_eq!(session.store().active_id(), Some(first.as_str()));
    }

    #[test]
    fn test_switching_does_not_echo_into_store() {
        let store = DocumentStore::load(Database::in_memory().unwrap());
        let mut session = EditorSession::new(store, CountingEngine::default(), Locale::En);
        let welcome = session.store().docs()[0].clone();

        let notes = session.create(Some("Notes"));
        assert_eq!(session.engine().content(), EMPTY_CONTENT);

        session.select(&welcome.id);
        assert_eq!(session.engine().content(), welcome.content);
        assert_eq!(session.store().get(&welcome.id).unwrap(), &welcome);

        session.select(&notes);
        assert_eq!(session.engine().emitted, 0);
    }

    #[test]
    fn test_engine_changes_update_active_doc() {
        let mut session = session();
        let id = session.create(Some("Draft"));

        session.edit("<p>typed</p>");
        assert_eq!(session.store().get(&id).unwrap().content, "<p>typed</p>");

        session.insert_prompt("summary").unwrap();
        let content = &session.store().get(&id).unwrap().content;
        assert_eq!(
            content,
            "<p>typed</p><p>Summary: Add 2-3 sentences that capture the core message.</p>"
        );
        assert_eq!(&session.engine().content(), content);
    }

    #[test]
    fn test_on_engine_change_reads_engine() {
        let mut session = session();
        let id = session.store().active_id().unwrap().to_string();

        session.engine_mut().set_content("<p>from input</p>", false);
        session.on_engine_change();
        assert_eq!(session.store().get(&id).unwrap().content, "<p>from input</p>");
    }

    #[test]
    fn test_delete_renders_next_doc() {
        let mut session = session();
        let welcome = session.store().docs()[0].clone();
        let scratch = session.create(Some("Scratch"));

        session.delete(&scratch);
        assert_eq!(session.store().active_id(), Some(welcome.id.as_str()));
        assert_eq!(session.engine().content(), welcome.content);

        session.delete(&welcome.id);
        assert_eq!(session.store().docs().len(), 1);
        let placeholder = session.active_doc().unwrap().clone();
        assert_ne!(placeholder.id, welcome.id);
        assert_eq!(session.engine().content(), placeholder.content);
    }

    #[test]
    fn test_apply_template() {
        let mut session = session();
        let id = session.create(None);

        let template = session.apply_template("meeting").unwrap();
        let doc = session.store().get(&id).unwrap();
        assert_eq!(doc.title, "Meeting Notes");
        assert_eq!(doc.content, template.content);
        assert_eq!(session.engine().content(), template.content);
        assert!(session.apply_template("unknown").is_none());
    }

    #[test]
    fn test_localized_templates() {
        let store = DocumentStore::load(Database::in_memory().unwrap());
        let mut session = EditorSession::new(store, HtmlBuffer::new(), Locale::Zh);
        session.apply_template("blog").unwrap();
        assert_eq!(session.active_doc().unwrap().title, "文章大纲");
    }

    #[test]
    fn test_restore_rerenders_engine() {
        let mut session = session();
        session.edit("<p>first</p>");
        let v1 = session.save_version().unwrap();
        session.rename("Renamed");
        session.edit("<p>second</p>");

        assert!(session.restore_version(&v1));
        let doc = session.active_doc().unwrap();
        assert_eq!(doc.content, "<p>first</p>");
        assert_eq!(doc.title, "Welcome");
        assert_eq!(doc.versions.len(), 1);
        assert_eq!(session.engine().content(), "<p>first</p>");

        assert!(!session.restore_version("missing"));
    }

    #[test]
    fn test_search_titles() {
        let mut session = session();
        session.create(Some("Weekly Sync"));
        session.create(Some("Roadmap"));

        let hits: Vec<_> = session.search("  SYNC ").iter().map(|d| d.title.clone()).collect();
        assert_eq!(hits, vec!["Weekly Sync"]);
        assert_eq!(session.search("").len(), 3);
        assert!(session.search("nothing").is_empty());
    }

    #[test]
    fn test_export_active_content() {
        let mut session = session();
        session.apply_template("brief").unwrap();
        let converter = MarkdownConverter::new().unwrap();

        let mut clipboard = MemoryClipboard::default();
        let markdown = session
            .export(ExportFormat::Markdown, &converter, &mut clipboard)
            .unwrap();
        assert!(markdown.starts_with("## Product Brief\n\nSummarize the product in one sentence."));
        assert!(markdown.contains("### Next Steps"));
        assert_eq!(clipboard.contents(), Some(markdown.as_str()));

        let mut unavailable = MemoryClipboard::unavailable();
        assert!(matches!(
            session.export(ExportFormat::Html, &converter, &mut unavailable),
            Err(ExportError::ClipboardUnavailable)
        ));
    }

    #[test]
    fn test_session_state_survives_restart() {
        let db = Arc::new(Database::in_memory().unwrap());
        let id = {
            let store = DocumentStore::load(db.clone());
            let mut session = EditorSession::new(store, HtmlBuffer::new(), Locale::En);
            let id = session.create(Some("Persisted"));
            session.edit("<p>kept</p>");
            id
        };

        let session = EditorSession::new(DocumentStore::load(db), HtmlBuffer::new(), Locale::En);
        assert_eq!(session.store().active_id(), Some(id.as_str()));
        assert_eq!(session.engine().content(), "<p>kept</p>");
    }
}
