//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "rich-editor",
    version,
    about = "Local rich-text documents with version history",
    long_about = "Create, edit and snapshot rich-text documents stored in a local database.\n\n\
                  Each invocation loads the store, applies one command and writes it back."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Database file (default: <data dir>/rich-editor/rich-editor.db).
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,

    /// Storage slot holding the document collection.
    #[arg(long = "slot", value_name = "KEY", global = true)]
    pub slot: Option<String>,

    /// Locale for templates and prompts (e.g. en, zh-CN).
    #[arg(long = "locale", value_name = "LOCALE", global = true)]
    pub locale: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Explicit log level (overrides -v).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List documents, newest first.
    List {
        /// Only show documents whose title contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Create a document and make it active.
    New {
        /// Title (defaults to "Untitled").
        title: Option<String>,
    },

    /// Make a document active.
    Open {
        /// Document id or unique prefix.
        id: String,
    },

    /// Print the active document.
    Show,

    /// Rename the active document.
    Rename { title: String },

    /// Replace the active document's content.
    Edit(EditArgs),

    /// Delete a document.
    Delete {
        /// Document id or unique prefix.
        id: String,
    },

    /// Save a version of the active document.
    Snapshot,

    /// List saved versions of the active document.
    Versions,

    /// Restore a saved version into the active document.
    Restore {
        /// Version id or unique prefix.
        version_id: String,
    },

    /// List available templates.
    Templates,

    /// Replace the active document with a template.
    ApplyTemplate { key: String },

    /// List assistant prompts.
    Prompts,

    /// Append an assistant prompt to the active document.
    InsertPrompt { key: String },

    /// Export the active document.
    Export(ExportArgs),

    /// Discard all documents and start from the welcome document.
    Reset,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct EditArgs {
    /// New content as markup.
    #[arg(long)]
    pub content: Option<String>,

    /// Read new content from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output format.
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: ExportFormatArg,

    /// Print to stdout instead of copying to the clipboard.
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Html,
    Markdown,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
