//! Local persistence for recorded sessions.
//!
//! Each session lives in its own directory under the storage root:
//!
//! ```text
//! <root>/<uuid>/
//!   session.json     # SessionMeta: name, created-at, approval flags
//!   events.jsonl     # one codec-encoded event document per line
//! ```
//!
//! The event log goes through the save-file codec, not serde derives: the
//! document shape is the wire contract. A line that fails to decode refuses
//! the whole log rather than producing a partial session.

use std::{fs, io, path::PathBuf};

// Traits must be in scope for `.lines()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use uuid::Uuid;

use crate::codec;
use crate::model::Event;
use crate::session::SessionMeta;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("session already exists: {0}")]
    SessionAlreadyExists(Uuid),

    #[error("malformed event document at line {line}")]
    EventMalformed { line: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for sessions and their event logs.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.wake/sessions/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wake").join("sessions"))
    }

    // ── Sessions ──

    /// Creates a new session, writing its metadata to disk.
    pub fn create_session(&self, meta: &SessionMeta) -> Result<()> {
        let dir = self.session_dir(meta.id);
        if dir.exists() {
            return Err(StorageError::SessionAlreadyExists(meta.id));
        }
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(dir.join("session.json"), json)?;
        Ok(())
    }

    /// Updates a session's metadata on disk.
    pub fn update_session(&self, meta: &SessionMeta) -> Result<()> {
        let path = self.session_dir(meta.id).join("session.json");
        if !path.exists() {
            return Err(StorageError::SessionNotFound(meta.id));
        }
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a single session's metadata.
    pub fn load_session(&self, id: Uuid) -> Result<SessionMeta> {
        let path = self.session_dir(id).join("session.json");
        if !path.exists() {
            return Err(StorageError::SessionNotFound(id));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Lists all sessions by reading each session directory's metadata.
    pub fn list_sessions(&self) -> Result<Vec<SessionMeta>> {
        let mut sessions = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(sessions),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path().join("session.json");
            if path.is_file() {
                let json = fs::read_to_string(&path)?;
                sessions.push(serde_json::from_str(&json)?);
            }
        }
        sessions.sort_by(|a: &SessionMeta, b: &SessionMeta| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }

    // ── Event log ──

    /// Appends an event to a session's log.
    pub fn append_event(&self, session_id: Uuid, event: &Event) -> Result<()> {
        let dir = self.session_dir(session_id);
        if !dir.exists() {
            return Err(StorageError::SessionNotFound(session_id));
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("events.jsonl"))?;
        let mut line = codec::encode_event(event).to_string();
        line.push('\n');
        file.write_all(line.as_bytes())?;
        tracing::debug!(session = %session_id, drivers = event.drivers.len(), "appended event");
        Ok(())
    }

    /// Loads a session's full event log.
    ///
    /// A line that fails to decode is a hard error: a corrupt save refuses
    /// to load instead of yielding a partial history.
    pub fn load_events(&self, session_id: Uuid) -> Result<Vec<Event>> {
        let path = self.session_dir(session_id).join("events.jsonl");
        if !path.exists() {
            if !self.session_dir(session_id).exists() {
                return Err(StorageError::SessionNotFound(session_id));
            }
            return Ok(Vec::new());
        }
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let doc: serde_json::Value = serde_json::from_str(&line)?;
            let event = codec::decode_event(&doc)
                .ok_or(StorageError::EventMalformed { line: index + 1 })?;
            events.push(event);
        }
        Ok(events)
    }

    /// Rewrites a session's event log in full, e.g. after committed edits.
    ///
    /// Writes to a temporary file first so a crash mid-write can't truncate
    /// the log.
    pub fn save_events(&self, session_id: Uuid, events: &[Event]) -> Result<()> {
        let dir = self.session_dir(session_id);
        if !dir.exists() {
            return Err(StorageError::SessionNotFound(session_id));
        }
        let mut lines = String::new();
        for event in events {
            lines.push_str(&codec::encode_event(event).to_string());
            lines.push('\n');
        }
        let tmp = dir.join("events.jsonl.tmp");
        fs::write(&tmp, lines)?;
        fs::rename(tmp, dir.join("events.jsonl"))?;
        Ok(())
    }

    fn session_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::Driver;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("sessions")).unwrap();
        (dir, storage)
    }

    fn sample_meta() -> SessionMeta {
        SessionMeta::new("crash repro")
    }

    fn sample_event(cause: &str) -> Event {
        Event::new(
            vec![
                Driver::new(format!("{cause}-label"), format!("{cause}-action"), cause),
                Driver::new("idle-label", "", "idle"),
            ],
            Driver::new(format!("{cause}-label"), format!("{cause}-action"), cause),
            "effect",
            "context",
            "",
        )
        .unwrap()
    }

    #[test]
    fn create_and_load_session() {
        let (_dir, storage) = test_storage();
        let meta = sample_meta();

        storage.create_session(&meta).unwrap();
        let loaded = storage.load_session(meta.id).unwrap();

        assert_eq!(loaded.id, meta.id);
        assert_eq!(loaded.name, meta.name);
    }

    #[test]
    fn create_duplicate_session_fails() {
        let (_dir, storage) = test_storage();
        let meta = sample_meta();

        storage.create_session(&meta).unwrap();
        let err = storage.create_session(&meta).unwrap_err();

        assert!(matches!(err, StorageError::SessionAlreadyExists(_)));
    }

    #[test]
    fn load_nonexistent_session_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_session(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::SessionNotFound(_)));
    }

    #[test]
    fn update_session_approvals() {
        let (_dir, storage) = test_storage();
        let mut meta = sample_meta();

        storage.create_session(&meta).unwrap();
        meta.approved = vec![true, false];
        storage.update_session(&meta).unwrap();

        let loaded = storage.load_session(meta.id).unwrap();
        assert_eq!(loaded.approved, vec![true, false]);
    }

    #[test]
    fn update_nonexistent_session_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.update_session(&sample_meta()).unwrap_err();

        assert!(matches!(err, StorageError::SessionNotFound(_)));
    }

    #[test]
    fn list_sessions_empty() {
        let (_dir, storage) = test_storage();
        assert!(storage.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn list_sessions_returns_all_sorted_by_created_at() {
        let (_dir, storage) = test_storage();

        let mut first = sample_meta();
        first.name = "first".into();
        first.created_at = Timestamp::new(1_000_000_000, 0).unwrap();

        let mut second = sample_meta();
        second.name = "second".into();
        second.created_at = Timestamp::new(2_000_000_000, 0).unwrap();

        // Create in reverse order to verify sorting.
        storage.create_session(&second).unwrap();
        storage.create_session(&first).unwrap();

        let sessions = storage.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].name, "first");
        assert_eq!(sessions[1].name, "second");
    }

    #[test]
    fn append_and_load_events() {
        let (_dir, storage) = test_storage();
        let meta = sample_meta();
        storage.create_session(&meta).unwrap();

        storage.append_event(meta.id, &sample_event("tap")).unwrap();
        storage
            .append_event(meta.id, &sample_event("scroll"))
            .unwrap();

        let events = storage.load_events(meta.id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].cause.label, "tap-label");
        assert_eq!(events[1].cause.label, "scroll-label");
    }

    #[test]
    fn load_events_empty_when_no_log() {
        let (_dir, storage) = test_storage();
        let meta = sample_meta();
        storage.create_session(&meta).unwrap();

        assert!(storage.load_events(meta.id).unwrap().is_empty());
    }

    #[test]
    fn load_events_nonexistent_session_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_events(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::SessionNotFound(_)));
    }

    #[test]
    fn corrupt_event_line_refuses_the_log() {
        let (dir, storage) = test_storage();
        let meta = sample_meta();
        storage.create_session(&meta).unwrap();
        storage.append_event(meta.id, &sample_event("tap")).unwrap();

        // A structurally valid document that is not a valid event.
        let log = dir
            .path()
            .join("sessions")
            .join(meta.id.to_string())
            .join("events.jsonl");
        let mut file = fs::OpenOptions::new().append(true).open(log).unwrap();
        file.write_all(b"{\"drivers\":[]}\n").unwrap();

        let err = storage.load_events(meta.id).unwrap_err();
        assert!(matches!(err, StorageError::EventMalformed { line: 2 }));
    }

    #[test]
    fn save_events_rewrites_the_log() {
        let (_dir, storage) = test_storage();
        let meta = sample_meta();
        storage.create_session(&meta).unwrap();
        storage.append_event(meta.id, &sample_event("tap")).unwrap();

        let mut edited = sample_event("tap");
        edited.pending_effect_edit = Some("{\"fixed\":true}".into());
        storage.save_events(meta.id, &[edited.clone()]).unwrap();

        let events = storage.load_events(meta.id).unwrap();
        assert_eq!(events, vec![edited]);
    }

    #[test]
    fn append_event_nonexistent_session_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .append_event(Uuid::new_v4(), &sample_event("tap"))
            .unwrap_err();

        assert!(matches!(err, StorageError::SessionNotFound(_)));
    }
}
