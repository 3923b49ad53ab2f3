use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::{Document, UpdateDocumentInput, Version, MAX_VERSIONS};

/// The complete persisted state of the document store.
///
/// Every mutation below is one transition over the whole value; lookups that
/// miss leave the state untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub docs: Vec<Document>,
    pub active_id: Option<String>,
}

impl StoreState {
    /// Initial state: a single welcome document, selected
    pub fn seeded() -> Self {
        let doc = Document::sample();
        StoreState {
            active_id: Some(doc.id.clone()),
            docs: vec![doc],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.docs.iter_mut().find(|d| d.id == id)
    }

    pub fn active_doc(&self) -> Option<&Document> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Prepend a new document and make it active
    pub fn create_doc(&mut self, title: Option<&str>) -> String {
        let doc = Document::new(title);
        let id = doc.id.clone();
        self.docs.insert(0, doc);
        self.active_id = Some(id.clone());
        id
    }

    /// Merge the present fields into the document. Returns false if `id` is unknown.
    pub fn update_doc(&mut self, id: &str, input: UpdateDocumentInput) -> bool {
        let Some(doc) = self.get_mut(id) else {
            return false;
        };

        if let Some(title) = input.title {
            doc.title = title;
        }
        if let Some(content) = input.content {
            doc.content = content;
        }
        doc.updated_at = Utc::now();
        true
    }

    pub fn set_active(&mut self, id: &str) {
        self.active_id = Some(id.to_string());
    }

    /// Remove a document. The store is never left empty: removing the last
    /// document replaces it with a fresh welcome document.
    pub fn delete_doc(&mut self, id: &str) -> bool {
        let before = self.docs.len();
        self.docs.retain(|d| d.id != id);
        let removed = self.docs.len() != before;

        if self.docs.is_empty() {
            let fallback = Document::sample();
            self.active_id = Some(fallback.id.clone());
            self.docs.push(fallback);
        } else if self.active_id.as_deref() == Some(id) {
            self.active_id = self.docs.first().map(|d| d.id.clone());
        }

        removed
    }

    /// Snapshot the document's current title and content
    pub fn save_version(&mut self, id: &str) -> Option<String> {
        let doc = self.get_mut(id)?;
        let version = Version::capture(doc);
        let version_id = version.id.clone();

        doc.versions.insert(0, version);
        doc.versions.truncate(MAX_VERSIONS);
        Some(version_id)
    }

    /// Overwrite title and content from a snapshot. History is left as-is and the
    /// pre-restore state is not captured.
    pub fn restore_version(&mut self, doc_id: &str, version_id: &str) -> bool {
        let Some(doc) = self.get_mut(doc_id) else {
            return false;
        };
        let Some(version) = doc.find_version(version_id).cloned() else {
            return false;
        };

        doc.title = version.title;
        doc.content = version.content;
        doc.updated_at = Utc::now();
        true
    }

    /// True when `active_id` points at a member of `docs`
    pub fn active_is_valid(&self) -> bool {
        self.active_doc().is_some()
    }
}
