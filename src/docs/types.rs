use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of snapshots retained per document
pub const MAX_VERSIONS: usize = 12;
/// Title used when a document is created without one
pub const DEFAULT_TITLE: &str = "Untitled";
/// Content of a freshly created document
pub const EMPTY_CONTENT: &str = "<p></p>";

pub const SAMPLE_TITLE: &str = "Welcome";
pub const SAMPLE_CONTENT: &str =
    "<h2>Welcome to Rich Editor</h2><p>Start writing your story here.</p>";

/// A document owned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String, // HTML markup from the rich text engine
    pub updated_at: DateTime<Utc>,
    /// Most recent first, at most `MAX_VERSIONS`
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl Document {
    /// Create an empty document, trimming the title and falling back to "Untitled"
    pub fn new(title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE);

        Document {
            id: new_id(),
            title: title.to_string(),
            content: EMPTY_CONTENT.to_string(),
            updated_at: Utc::now(),
            versions: Vec::new(),
        }
    }

    /// The welcome document seeded on first run and whenever the store would be empty
    pub fn sample() -> Self {
        Document {
            id: new_id(),
            title: SAMPLE_TITLE.to_string(),
            content: SAMPLE_CONTENT.to_string(),
            updated_at: Utc::now(),
            versions: Vec::new(),
        }
    }

    pub fn find_version(&self, version_id: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == version_id)
    }
}

/// Immutable snapshot of a document's title and content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Version {
    pub fn capture(doc: &Document) -> Self {
        Version {
            id: new_id(),
            title: doc.title.clone(),
            content: doc.content.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Input for updating an existing document; only present fields are overwritten
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDocumentInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateDocumentInput {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
