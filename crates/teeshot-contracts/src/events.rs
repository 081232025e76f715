use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

/// Everything a run can record, in the order a successful run records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RunStarted,
    GenerationStarted,
    MockupStarted,
    MockupCreated,
    GenerationFailed,
    CollageCreated,
    CollageFailed,
    ExportCompleted,
    ExportFellBack,
    RunFinished,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RunStarted => "run_started",
            EventKind::GenerationStarted => "generation_started",
            EventKind::MockupStarted => "mockup_started",
            EventKind::MockupCreated => "mockup_created",
            EventKind::GenerationFailed => "generation_failed",
            EventKind::CollageCreated => "collage_created",
            EventKind::CollageFailed => "collage_failed",
            EventKind::ExportCompleted => "export_completed",
            EventKind::ExportFellBack => "export_fell_back",
            EventKind::RunFinished => "run_finished",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only `events.jsonl` for one output directory.
///
/// Lines are `{type, run_id, ts, ..payload}`. [`EventWriter::discard`] builds
/// the same value but never opens a file.
#[derive(Debug, Clone)]
pub struct EventWriter {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    path: Option<PathBuf>,
    run_id: String,
    append: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self::with_target(Some(path.into()), run_id.into())
    }

    pub fn discard(run_id: impl Into<String>) -> Self {
        Self::with_target(None, run_id.into())
    }

    fn with_target(path: Option<PathBuf>, run_id: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                path,
                run_id,
                append: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.shared.path.as_deref()
    }

    pub fn run_id(&self) -> &str {
        &self.shared.run_id
    }

    /// Records `kind` and returns the line as written. Payload keys may not
    /// override `type` or `run_id`.
    pub fn emit(&self, kind: EventKind, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = payload;
        event.insert("type".to_string(), Value::from(kind.as_str()));
        event.insert("run_id".to_string(), Value::from(self.run_id()));
        event
            .entry("ts".to_string())
            .or_insert_with(|| Value::from(now_utc_iso()));
        let event = Value::Object(event);

        let Some(path) = self.path() else {
            return Ok(event);
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let _append = self
            .shared
            .append
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?
            .write_all(line.as_bytes())?;
        Ok(event)
    }
}

pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
