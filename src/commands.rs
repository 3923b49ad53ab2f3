use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::cli::{Command, EditArgs, ExportArgs, ExportFormatArg};
use crate::config::EditorConfig;
use crate::database::{Database, DbError, KeyValueSlot};
use crate::docs::DocumentStore;
use crate::editor::{prompts, templates, EditorSession, HtmlBuffer};
use crate::export::{ExportError, ExportFormat, MarkdownConverter, MemoryClipboard, SystemClipboard};

/// Session type used by the command line
pub type CliSession = EditorSession<Arc<Database>, HtmlBuffer>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No document matches '{0}'")]
    UnknownDocument(String),
    #[error("'{0}' matches more than one document")]
    AmbiguousDocument(String),
    #[error("No version matches '{0}'")]
    UnknownVersion(String),
    #[error("'{0}' matches more than one version")]
    AmbiguousVersion(String),
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),
    #[error("Unknown prompt '{0}'")]
    UnknownPrompt(String),
    #[error("No active document")]
    NoActiveDocument,
    #[error("Markdown converter unavailable: {0}")]
    Converter(#[from] regex::Error),
}

/// Open the database and load the document store described by `config`
pub fn open_session(config: &EditorConfig) -> Result<CliSession, CommandError> {
    let db = Arc::new(Database::open(&config.database_path)?);
    info!(path = %config.database_path.display(), slot = %config.slot_key, "Opened database");

    let store = DocumentStore::load_with_key(db, config.slot_key.clone());
    Ok(EditorSession::new(store, HtmlBuffer::new(), config.locale))
}

/// Run one command against a session, writing human-readable output to `out`
pub fn execute<S: KeyValueSlot>(
    session: &mut EditorSession<S, HtmlBuffer>,
    command: Command,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    match command {
        Command::List { search } => list_documents(session, search.as_deref().unwrap_or(""), out),
        Command::New { title } => {
            let id = session.create(title.as_deref());
            let title = session.active_doc().map_or("", |d| d.title.as_str());
            writeln!(out, "Created {} {}", short_id(&id), title)?;
            Ok(())
        }
        Command::Open { id } => {
            let id = resolve_document(session, &id)?;
            session.select(&id);
            show_active(session, out)
        }
        Command::Show => show_active(session, out),
        Command::Rename { title } => {
            session.rename(&title);
            writeln!(out, "Renamed to {title}")?;
            Ok(())
        }
        Command::Edit(args) => {
            let markup = read_edit_input(&args)?;
            session.edit(&markup);
            writeln!(out, "Updated content")?;
            Ok(())
        }
        Command::Delete { id } => {
            let id = resolve_document(session, &id)?;
            session.delete(&id);
            let active = session.active_doc().ok_or(CommandError::NoActiveDocument)?;
            writeln!(
                out,
                "Deleted {}; active is now {} {}",
                short_id(&id),
                short_id(&active.id),
                active.title
            )?;
            Ok(())
        }
        Command::Snapshot => {
            let version_id = session
                .save_version()
                .ok_or(CommandError::NoActiveDocument)?;
            writeln!(out, "Saved version {}", short_id(&version_id))?;
            Ok(())
        }
        Command::Versions => list_versions(session, out),
        Command::Restore { version_id } => {
            let version_id = resolve_version(session, &version_id)?;
            if !session.restore_version(&version_id) {
                return Err(CommandError::UnknownVersion(version_id));
            }
            writeln!(out, "Restored version {}", short_id(&version_id))?;
            Ok(())
        }
        Command::Templates => {
            for template in templates(session.locale()) {
                writeln!(
                    out,
                    "{:<10} {} - {}",
                    template.key, template.title, template.description
                )?;
            }
            Ok(())
        }
        Command::ApplyTemplate { key } => {
            let template = session
                .apply_template(&key)
                .ok_or(CommandError::UnknownTemplate(key))?;
            writeln!(out, "Applied template {}", template.title)?;
            Ok(())
        }
        Command::Prompts => {
            for prompt in prompts(session.locale()) {
                writeln!(out, "{:<10} {}", prompt.key, prompt.title)?;
            }
            Ok(())
        }
        Command::InsertPrompt { key } => {
            let prompt = session
                .insert_prompt(&key)
                .ok_or(CommandError::UnknownPrompt(key))?;
            writeln!(out, "Inserted prompt {}", prompt.title)?;
            Ok(())
        }
        Command::Export(args) => export_active(session, &args, out),
        Command::Reset => {
            session.reset();
            writeln!(out, "Cleared all documents")?;
            Ok(())
        }
    }
}

fn list_documents<S: KeyValueSlot>(
    session: &EditorSession<S, HtmlBuffer>,
    query: &str,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let active_id = session.store().active_id();
    let docs = session.search(query);

    if docs.is_empty() {
        writeln!(out, "No documents found")?;
        return Ok(());
    }

    for doc in docs {
        let marker = if Some(doc.id.as_str()) == active_id { '*' } else { ' ' };
        writeln!(
            out,
            "{} {}  {}  (updated {})",
            marker,
            short_id(&doc.id),
            doc.title,
            format_time(&doc.updated_at)
        )?;
    }
    Ok(())
}

fn show_active<S: KeyValueSlot>(
    session: &EditorSession<S, HtmlBuffer>,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let doc = session.active_doc().ok_or(CommandError::NoActiveDocument)?;
    writeln!(out, "{} ({})", doc.title, doc.id)?;
    writeln!(
        out,
        "updated {}, {} version(s)",
        format_time(&doc.updated_at),
        doc.versions.len()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", doc.content)?;
    Ok(())
}

fn list_versions<S: KeyValueSlot>(
    session: &EditorSession<S, HtmlBuffer>,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let doc = session.active_doc().ok_or(CommandError::NoActiveDocument)?;
    if doc.versions.is_empty() {
        writeln!(out, "No versions saved")?;
        return Ok(());
    }

    for version in &doc.versions {
        writeln!(
            out,
            "{}  {}  {}",
            short_id(&version.id),
            version.title,
            format_time(&version.created_at)
        )?;
    }
    Ok(())
}

fn export_active<S: KeyValueSlot>(
    session: &EditorSession<S, HtmlBuffer>,
    args: &ExportArgs,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let format = match args.format {
        ExportFormatArg::Html => ExportFormat::Html,
        ExportFormatArg::Markdown => ExportFormat::Markdown,
    };
    let converter = MarkdownConverter::new()?;

    if args.stdout {
        let mut buffer = MemoryClipboard::default();
        let text = session.export(format, &converter, &mut buffer)?;
        writeln!(out, "{text}")?;
    } else {
        let mut clipboard = SystemClipboard;
        session.export(format, &converter, &mut clipboard)?;
        writeln!(out, "Copied {} to clipboard", format.as_str())?;
    }
    Ok(())
}

fn read_edit_input(args: &EditArgs) -> Result<String, CommandError> {
    match (&args.content, &args.file) {
        (Some(content), _) => Ok(content.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|source| {
            CommandError::ReadInput {
                path: path.clone(),
                source,
            }
        }),
        (None, None) => Ok(String::new()),
    }
}

enum PrefixMatch {
    None,
    One(String),
    Many,
}

/// Exact id wins; otherwise the query must be a prefix of exactly one id
fn match_prefix<'a>(ids: impl IntoIterator<Item = &'a str>, query: &str) -> PrefixMatch {
    let query = query.trim();
    if query.is_empty() {
        return PrefixMatch::None;
    }

    let mut found: Option<&str> = None;
    let mut ambiguous = false;
    for id in ids {
        if id == query {
            return PrefixMatch::One(id.to_string());
        }
        if id.starts_with(query) {
            ambiguous |= found.is_some();
            found = Some(id);
        }
    }

    match (found, ambiguous) {
        (_, true) => PrefixMatch::Many,
        (Some(id), false) => PrefixMatch::One(id.to_string()),
        (None, false) => PrefixMatch::None,
    }
}

fn resolve_document<S: KeyValueSlot>(
    session: &EditorSession<S, HtmlBuffer>,
    query: &str,
) -> Result<String, CommandError> {
    let ids = session.store().docs().iter().map(|d| d.id.as_str());
    match match_prefix(ids, query) {
        PrefixMatch::One(id) => Ok(id),
        PrefixMatch::None => Err(CommandError::UnknownDocument(query.to_string())),
        PrefixMatch::Many => Err(CommandError::AmbiguousDocument(query.to_string())),
    }
}

fn resolve_version<S: KeyValueSlot>(
    session: &EditorSession<S, HtmlBuffer>,
    query: &str,
) -> Result<String, CommandError> {
    let doc = session.active_doc().ok_or(CommandError::NoActiveDocument)?;
    let ids = doc.versions.iter().map(|v| v.id.as_str());
    match match_prefix(ids, query) {
        PrefixMatch::One(id) => Ok(id),
        PrefixMatch::None => Err(CommandError::UnknownVersion(query.to_string())),
        PrefixMatch::Many => Err(CommandError::AmbiguousVersion(query.to_string())),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_time(value: &DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format("%b %-d, %Y %H:%M")
        .to_string()
}
