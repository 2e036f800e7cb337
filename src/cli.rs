//! CLI interface for Wake.
//!
//! Bare `wake` opens the timeline UI. Subcommands manage recorded sessions
//! from the command line: arguments in, structured output out.
//!
//! Session IDs are accepted as a full UUID or an unambiguous prefix
//! (e.g. `a3b`).

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::codec;
use crate::config::Config;
use crate::model::Event;
use crate::session::SessionMeta;
use crate::storage::Storage;
use crate::tui;

/// Wake: replay the history of a cause→effect session.
#[derive(Debug, Parser)]
#[command(name = "wake", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Session storage root. Overrides the config file and the default
    /// `~/.wake/sessions`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

const WORKFLOW_HELP: &str = r#"Workflow: reviewing a recorded session
  1. wake import recording.json --name "crash repro"
     → prints a session ID (e.g. a3b0fc12)
  2. wake
     → open the timeline UI: scrub with ←/→, approve with space,
       edit pending state with e, save with s
  3. wake export a3b reviewed.json"#;

#[derive(Debug, Subcommand)]
enum Command {
    /// List recorded sessions.
    List,

    /// Import a session save file: a JSON array of event documents.
    ///
    /// The whole file is refused if any document fails to decode.
    Import {
        path: PathBuf,

        /// Display name for the new session. Defaults to the file stem.
        #[arg(long)]
        name: Option<String>,
    },

    /// Export a session's events to a save file.
    Export {
        /// Session ID: full UUID or unambiguous prefix.
        session: String,

        path: PathBuf,
    },
}

/// Parses arguments and dispatches. Returns a user-facing error string on
/// failure; the caller owns the exit code.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let root = cli
        .root
        .or(config.session_root)
        .or_else(Storage::default_root)
        .ok_or("could not determine home directory")?;
    let storage = Storage::new(root).map_err(|e| e.to_string())?;

    match cli.command {
        None => tui::run(&storage).map_err(|e| e.to_string()),
        Some(Command::List) => list(&storage),
        Some(Command::Import { path, name }) => import(&storage, &path, name),
        Some(Command::Export { session, path }) => export(&storage, &session, &path),
    }
}

fn list(storage: &Storage) -> Result<(), String> {
    let sessions = storage.list_sessions().map_err(|e| e.to_string())?;
    if sessions.is_empty() {
        println!("No sessions. Import one with `wake import <file>`.");
        return Ok(());
    }
    for meta in sessions {
        let events = storage.load_events(meta.id).map_err(|e| e.to_string())?;
        let approved = meta.approved.iter().filter(|&&a| a).count();
        println!(
            "{}  {}  {} events ({approved} approved)  {}",
            &meta.id.to_string()[..8],
            meta.name,
            events.len(),
            meta.created_at
        );
    }
    Ok(())
}

fn import(storage: &Storage, path: &Path, name: Option<String>) -> Result<(), String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    let docs = doc
        .as_array()
        .ok_or_else(|| format!("{} is not an array of event documents", path.display()))?;

    let events = docs
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            codec::decode_event(doc)
                .ok_or_else(|| format!("malformed event document at index {index}"))
        })
        .collect::<Result<Vec<Event>, String>>()?;

    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| "imported".into(), |stem| stem.to_string_lossy().into())
    });
    let meta = SessionMeta::new(name);
    storage.create_session(&meta).map_err(|e| e.to_string())?;
    for event in &events {
        storage.append_event(meta.id, event).map_err(|e| e.to_string())?;
    }

    tracing::info!(id = %meta.id, events = events.len(), "imported session");
    println!("{}  {} ({} events)", meta.id, meta.name, events.len());
    Ok(())
}

fn export(storage: &Storage, session: &str, path: &Path) -> Result<(), String> {
    let meta = resolve_session(storage, session)?;
    let events = storage.load_events(meta.id).map_err(|e| e.to_string())?;
    let docs: Vec<serde_json::Value> = events.iter().map(codec::encode_event).collect();
    let json = serde_json::to_string_pretty(&serde_json::Value::Array(docs))
        .map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    println!("{} events → {}", events.len(), path.display());
    Ok(())
}

/// Resolves a full UUID or unambiguous prefix to a session.
fn resolve_session(storage: &Storage, prefix: &str) -> Result<SessionMeta, String> {
    let sessions = storage.list_sessions().map_err(|e| e.to_string())?;
    let matches: Vec<SessionMeta> = sessions
        .into_iter()
        .filter(|meta| meta.id.to_string().starts_with(prefix))
        .collect();
    if matches.len() > 1 {
        return Err(format!(
            "'{prefix}' is ambiguous: {} sessions match",
            matches.len()
        ));
    }
    matches
        .into_iter()
        .next()
        .ok_or_else(|| format!("no session matches '{prefix}'"))
}
