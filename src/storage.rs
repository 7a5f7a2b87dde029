//! Local key-value storage for the board.
//!
//! The board lives under a single key as a JSON array of task records, the
//! same shape a browser keeps in `localStorage`. Loading is forgiving: older
//! records without a description or a position are filled in, and anything
//! unreadable falls back to the starter board.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::board::{random_tilt, PIN_TILT_DEG};
use crate::error::StorageError;
use crate::fields::Priority;
use crate::geometry::Point;
use crate::task::{deadline_format, local_to_utc, Task, TaskId};

/// Storage key holding the whole board.
pub const TODOS_KEY: &str = "todos";

/// Minimal string key-value store, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => Ok(Some(buf)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    /// Atomic-ish write via temp file + rename.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { key: key.to_string(), source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(value.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        debug!(key, path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }
}

/// In-memory store, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A task record as found in storage, from any schema version.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: TaskId,
    name: String,
    #[serde(default)]
    is_done: bool,
    #[serde(default = "default_priority_level")]
    priority: i64,
    #[serde(default, with = "deadline_format")]
    deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    rotate: Option<f64>,
}

fn default_priority_level() -> i64 {
    Priority::default().level() as i64
}

impl StoredTask {
    fn into_task<R: Rng + ?Sized>(self, index: usize, rng: &mut R) -> Task {
        let slot = grid_position(index);
        Task {
            id: self.id,
            name: self.name,
            is_done: self.is_done,
            priority: Priority::from_level_lenient(self.priority),
            deadline: self.deadline,
            description: self.description.unwrap_or_default(),
            x: self.x.unwrap_or(slot.x),
            y: self.y.unwrap_or(slot.y),
            rotate: self.rotate.unwrap_or_else(|| random_tilt(rng, PIN_TILT_DEG)),
        }
    }
}

/// Fallback layout for notes that have never been placed: rows of eight,
/// stepping 60px right and 70px down.
pub fn grid_position(index: usize) -> Point {
    Point::new(((index * 60) % 500 + 30) as f64, ((index / 8) * 70 + 30) as f64)
}

/// The board shown on first launch or when stored data is unreadable.
pub fn starter_tasks<R: Rng + ?Sized>(rng: &mut R) -> Vec<Task> {
    let deadline = NaiveDate::from_ymd_opt(2024, 11, 2)
        .and_then(|d| d.and_hms_opt(17, 30, 0))
        .map(local_to_utc);
    let slot = grid_position(0);
    vec![Task {
        id: TaskId::new(),
        name: "Analysis II homework".to_string(),
        is_done: false,
        priority: Priority::High,
        deadline,
        description: String::new(),
        x: slot.x,
        y: slot.y,
        rotate: random_tilt(rng, PIN_TILT_DEG),
    }]
}

/// Decode a stored board, filling in fields older records lack.
/// Records repeating an earlier id are dropped.
pub fn decode_tasks<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Result<Vec<Task>, serde_json::Error> {
    let records: Vec<StoredTask> = serde_json::from_str(text)?;
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if !seen.insert(record.id.clone()) {
            warn!(id = %record.id, "dropping stored task with duplicate id");
            continue;
        }
        tasks.push(record.into_task(index, rng));
    }
    Ok(tasks)
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(tasks)?)
}

/// Load the board from `store`, or the starter board if nothing usable is there.
pub fn load_tasks<S, R>(store: &S, rng: &mut R) -> Vec<Task>
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    let text = match store.get(TODOS_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => {
            info!("no saved board, starting fresh");
            return starter_tasks(rng);
        }
        Err(e) => {
            warn!(error = %e, "error reading board, starting fresh");
            return starter_tasks(rng);
        }
    };
    match decode_tasks(&text, rng) {
        Ok(tasks) => {
            info!(count = tasks.len(), "loaded board");
            tasks
        }
        Err(e) => {
            warn!(error = %e, "error parsing board, starting fresh");
            starter_tasks(rng)
        }
    }
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(store: &mut S, tasks: &[Task]) -> Result<(), StorageError> {
    let text = encode_tasks(tasks)?;
    store.set(TODOS_KEY, &text)
}
