use std::path::PathBuf;

use crate::database::{default_database_path, DbError};
use crate::docs::STORE_SLOT_KEY;
use crate::editor::Locale;

/// Runtime settings for an editor session
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub database_path: PathBuf,
    pub slot_key: String,
    pub locale: Locale,
}

impl EditorConfig {
    /// Defaults, with the database under the user data directory
    pub fn resolve() -> Result<Self, DbError> {
        Ok(Self {
            database_path: default_database_path()?,
            slot_key: STORE_SLOT_KEY.to_string(),
            locale: Locale::default(),
        })
    }

    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    pub fn with_slot_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.slot_key = key;
        }
        self
    }

    pub fn with_locale(mut self, tag: Option<&str>) -> Self {
        if let Some(tag) = tag {
            self.locale = Locale::from_tag(tag);
        }
        self
    }
}
