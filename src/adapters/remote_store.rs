//! In-memory remote store.
//!
//! Implements [`RemoteStore`] over a `serde_json::Value` document laid out
//! like the real-time database the app talks to:
//!
//! ```text
//! /smart_lock
//!   ├── command          ""  | "lock" | "unlock" | "disarm"
//!   └── status
//!         ├── isOnline   bool
//!         ├── isLocked   bool
//!         ├── alert      "knock" | "none"
//!         ├── mode       "registration" | "normal"
//!         └── lastSeen   unix seconds
//! ```
//!
//! Used by the host simulation and the integration tests.  Faults can be
//! injected per operation to exercise the bridge's recovery paths.

use log::{debug, info};
use serde_json::{Map, Value};

use crate::app::ports::{FieldValue, RemoteStore, StatusField, StoreError, COMMAND_PATH};

/// How `start_session` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// The session is ready as soon as it is started.
    Immediate,
    /// The session stays pending until [`MemoryRemoteStore::complete_session`].
    Manual,
}

pub struct MemoryRemoteStore {
    root: String,
    doc: Value,
    mode: SessionMode,
    started: bool,
    ready: bool,
    session_starts: u32,
    /// Every successful status write, in order.
    history: Vec<(StatusField, Value)>,
    fail_reads: u32,
    fail_writes: u32,
}

impl MemoryRemoteStore {
    pub fn new(device_root: &str, mode: SessionMode) -> Self {
        Self {
            root: device_root.trim_end_matches('/').to_string(),
            doc: Value::Object(Map::new()),
            mode,
            started: false,
            ready: false,
            session_starts: 0,
            history: Vec::new(),
            fail_reads: 0,
            fail_writes: 0,
        }
    }

    fn full_path(&self, relative: &str) -> String {
        format!("{}/{}", self.root, relative)
    }

    fn get(&self, relative: &str) -> Option<&Value> {
        self.doc.pointer(&self.full_path(relative))
    }

    fn set(&mut self, relative: &str, value: Value) {
        let path = self.full_path(relative);
        let mut node = &mut self.doc;
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        while let Some(segment) = segments.next() {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return;
            };
            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return;
            }
            node = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    // ── App side ──────────────────────────────────────────────

    /// Write the command mailbox as the phone app would.
    pub fn push_command(&mut self, raw: &str) {
        self.set(COMMAND_PATH, Value::String(raw.to_string()));
    }

    /// Current mailbox contents, if it is a string.
    pub fn command(&self) -> Option<&str> {
        self.get(COMMAND_PATH).and_then(Value::as_str)
    }

    /// Current value of a status field.
    pub fn field(&self, field: StatusField) -> Option<&Value> {
        self.get(field.path())
    }

    /// Successful status writes, oldest first.
    pub fn history(&self) -> &[(StatusField, Value)] {
        &self.history
    }

    /// Number of successful writes to `field`.
    pub fn writes_to(&self, field: StatusField) -> usize {
        self.history.iter().filter(|(f, _)| *f == field).count()
    }

    pub fn session_starts(&self) -> u32 {
        self.session_starts
    }

    /// The whole document, for dumping.
    pub fn document(&self) -> &Value {
        &self.doc
    }

    // ── Fault injection ───────────────────────────────────────

    /// Mark a pending session as ready.
    pub fn complete_session(&mut self) {
        if self.started {
            self.ready = true;
        }
    }

    /// Drop the session as if the token expired.
    pub fn drop_session(&mut self) {
        self.started = false;
        self.ready = false;
    }

    /// Fail the next `n` mailbox reads with [`StoreError::Timeout`].
    pub fn fail_reads(&mut self, n: u32) {
        self.fail_reads = n;
    }

    /// Fail the next `n` writes (status fields and mailbox clears).
    pub fn fail_writes(&mut self, n: u32) {
        self.fail_writes = n;
    }

    fn check_write(&mut self) -> Result<(), StoreError> {
        if !self.ready {
            return Err(StoreError::NotReady);
        }
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(StoreError::IoError);
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn start_session(&mut self) {
        self.started = true;
        self.session_starts += 1;
        self.ready = self.mode == SessionMode::Immediate;
        info!("STORE: session started (ready={})", self.ready);
    }

    fn is_session_ready(&self) -> bool {
        self.ready
    }

    fn read_command(&mut self) -> Result<Option<String>, StoreError> {
        if !self.ready {
            return Err(StoreError::NotReady);
        }
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(StoreError::Timeout);
        }
        Ok(match self.get(COMMAND_PATH) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        })
    }

    fn clear_command(&mut self) -> Result<(), StoreError> {
        self.check_write()?;
        self.set(COMMAND_PATH, Value::String(String::new()));
        debug!("STORE: mailbox cleared");
        Ok(())
    }

    fn write_field(&mut self, field: StatusField, value: &FieldValue) -> Result<(), StoreError> {
        self.check_write()?;
        let json = serde_json::to_value(value).map_err(|_| StoreError::Rejected)?;
        self.set(field.path(), json.clone());
        self.history.push((field, json));
        Ok(())
    }
}
