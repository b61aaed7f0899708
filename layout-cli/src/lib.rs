//! # Layout Builder CLI
//!
//! Command-line host for the layout builder. It creates, checks, prints and
//! edits layout documents without a presentation layer.
//!
//! ## Usage
//!
//! ```bash
//! layout-builder new --viewport tablet -o layout.json
//! layout-builder apply layout.json edits.json -o layout.json
//! layout-builder inspect layout.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved configuration handed to [`run`]
//! - [`outline`] - Indented text rendering of an element tree

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use layout_core::{
    registry, replay, Command, EditorSession, Element, ElementTree, ExportOptions, LayoutDocument,
    SessionConfig, Viewport,
};
use thiserror::Error;

/// Command-line arguments for layout-builder.
#[derive(Debug, Clone, Parser)]
#[command(name = "layout-builder")]
#[command(about = "Create, inspect, validate and edit layout documents")]
#[command(version)]
pub struct CliArgs {
    /// Viewport for new documents (phone, tablet, laptop)
    #[arg(long, global = true, env = "LAYOUT_VIEWPORT", default_value_t = Viewport::Phone)]
    pub viewport: Viewport,

    /// Strip export-only keys from nested elements too
    #[arg(long, global = true, env = "LAYOUT_STRIP_NESTED")]
    pub strip_nested: bool,

    /// What to do
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Subcommands of layout-builder.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Write an empty layout document
    New {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a file is a well-formed layout document
    Validate {
        /// Document to check
        file: PathBuf,
    },
    /// Print the element outline of a document
    Inspect {
        /// Document to print
        file: PathBuf,
    },
    /// Replay a JSON array of session commands against a document
    Apply {
        /// Document to edit
        file: PathBuf,
        /// JSON file holding the commands
        ops: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the element types the builder knows
    Palette,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Session settings for new and loaded documents.
    pub session: SessionConfig,
    /// Subcommand to run.
    pub command: CliCommand,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            session: SessionConfig {
                viewport: args.viewport,
                export: ExportOptions {
                    strip_nested: args.strip_nested,
                },
            },
            command: args.command,
        }
    }
}

/// Failures reading or writing layout files.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A document failed validation.
    #[error("{} is not a valid layout document: {reason}", path.display())]
    Invalid {
        /// File path.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },
}

/// Run one subcommand, writing human output to `out`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, a document is
/// invalid, or the command list cannot be parsed.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        CliCommand::New { output } => {
            let session = EditorSession::with_config(config.session);
            emit(&session.export(), output.as_deref(), out)
        }
        CliCommand::Validate { file } => {
            let session = load(file, config.session)?;
            writeln!(
                out,
                "{}: ok ({} elements, {})",
                file.display(),
                session.tree().len(),
                session.viewport()
            )?;
            Ok(())
        }
        CliCommand::Inspect { file } => {
            let session = load(file, config.session)?;
            let profile = session.viewport().profile();
            writeln!(
                out,
                "{} ({}x{})",
                profile.name, profile.screen_width, profile.screen_height
            )?;
            out.write_all(outline(session.tree()).as_bytes())?;
            Ok(())
        }
        CliCommand::Apply { file, ops, output } => {
            let mut session = load(file, config.session)?;
            let commands = read_commands(ops)?;
            let report = replay(&mut session, &commands);
            for (position, reason) in &report.rejected {
                tracing::warn!(position, %reason, "command rejected");
            }
            tracing::info!(
                applied = report.applied,
                rejected = report.rejected.len(),
                created = report.created.len(),
                "applied commands"
            );
            emit(&session.export(), output.as_deref(), out)
        }
        CliCommand::Palette => {
            for definition in registry().definitions() {
                let nesting = if definition.supports_children() {
                    "  (holds children)"
                } else {
                    ""
                };
                writeln!(
                    out,
                    "{:<10} {}{}",
                    definition.element_type.as_str(),
                    definition.name,
                    nesting
                )?;
            }
            Ok(())
        }
    }
}

/// Render the tree as an indented outline, one element per line.
#[must_use]
pub fn outline(tree: &ElementTree) -> String {
    let mut text = String::new();
    for element in tree.elements() {
        outline_into(&mut text, element, 0);
    }
    text
}

fn outline_into(text: &mut String, element: &Element, depth: usize) {
    let _ = writeln!(
        text,
        "{:indent$}{}. {} \"{}\"",
        "",
        element.order,
        element.element_type,
        element.label(),
        indent = depth * 2
    );
    for child in element.children() {
        outline_into(text, child, depth + 1);
    }
}

fn load(path: &Path, config: SessionConfig) -> anyhow::Result<EditorSession> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| CliError::Invalid {
        path: path.to_path_buf(),
        reason,
    };

    let document = LayoutDocument::parse(&text).map_err(|e| invalid(e.to_string()))?;
    let mut session = EditorSession::with_config(config);
    session
        .load_document(document)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(session)
}

fn read_commands(path: &Path) -> anyhow::Result<Vec<Command>> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).with_context(|| format!("invalid command list in {}", path.display()))
}

fn emit(document: &LayoutDocument, output: Option<&Path>, out: &mut impl Write) -> anyhow::Result<()> {
    let json = document.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n")).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %path.display(), elements = document.elements.len(), "wrote layout document");
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}
