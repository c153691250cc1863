//! Bounded log of past analyses.
//!
//! The log is kept as a single JSON list under [`HISTORY_KEY`] in a key-value [`Store`]. New
//! records go to the front, and only the latest [`MAX_RECORDS`] are kept. All of that is enforced
//! by [`HistoryLog`]; a store only moves strings around.

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const HISTORY_KEY: &str = "poseHistory";
pub const MAX_RECORDS: usize = 50;

/// What kind of analysis a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Image,
    Video,
    Live,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Image => "image",
            Kind::Video => "video",
            Kind::Live => "live",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "image" => Kind::Image,
            "video" => Kind::Video,
            "live" => Kind::Live,
            _ => anyhow::bail!("unknown analysis kind '{}' (expected image, video or live)", s),
        })
    }
}

/// A stored analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// `NaN` if the score was not a number when the record was stored (JSON has no NaN and
    /// stores it as `null`).
    #[serde(deserialize_with = "nullable_score")]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn nullable_score<'de, D: Deserializer<'de>>(de: D) -> Result<f32, D::Error> {
    Ok(Option::<f32>::deserialize(de)?.unwrap_or(f32::NAN))
}

/// A record to be added to the log. The id and timestamp are assigned by [`HistoryLog::append`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub kind: Kind,
    pub score: f32,
    pub thumbnail: Option<String>,
    pub data: Option<Value>,
}

impl Entry {
    pub fn new(kind: Kind, score: f32) -> Self {
        Self {
            kind,
            score,
            thumbnail: None,
            data: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A string key-value store.
pub trait Store {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Removes `key`. Removing a key that does not exist is not an error.
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// A [`Store`] that lives only as long as the value itself.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A [`Store`] keeping every key in its own `<key>.json` file inside a directory.
///
/// The directory is created when the first value is stored.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read '{}'", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create '{}'", self.dir.display()))?;
        let path = self.path(key);
        fs::write(&path, value).with_context(|| format!("failed to write '{}'", path.display()))
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove '{}'", path.display())),
        }
    }
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The list of past analyses, most recent first.
pub struct HistoryLog<S> {
    store: S,
    clock: fn() -> i64,
}

impl<S: Store> HistoryLog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: now_ms,
        }
    }

    /// Replaces the wall clock used to timestamp new records. It returns milliseconds since the
    /// Unix epoch.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Returns all records, most recent first.
    ///
    /// Stored entries that cannot be decoded are logged and skipped. They stay in the store, so
    /// later updates do not lose them.
    pub fn list(&self) -> anyhow::Result<Vec<Record>> {
        Ok(self
            .load()?
            .iter()
            .filter_map(|value| match Record::deserialize(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("skipping unreadable history entry {}: {}", value, e);
                    None
                }
            })
            .collect())
    }

    /// Returns the records of one kind, most recent first.
    pub fn filter(&self, kind: Kind) -> anyhow::Result<Vec<Record>> {
        let mut records = self.list()?;
        records.retain(|r| r.kind == kind);
        Ok(records)
    }

    /// Adds `entry` to the front of the log, dropping the oldest entries beyond [`MAX_RECORDS`].
    ///
    /// Returns the id of the new record. Ids are the creation time in milliseconds, bumped if
    /// needed so that every id is greater than the one before it.
    pub fn append(&mut self, entry: Entry) -> anyhow::Result<String> {
        let mut entries = self.load()?;
        let timestamp = (self.clock)();
        let id = match entries.first().and_then(entry_id).and_then(|id| id.parse::<i64>().ok()) {
            Some(latest) if latest >= timestamp => latest + 1,
            _ => timestamp,
        }
        .to_string();

        let record = Record {
            id: id.clone(),
            kind: entry.kind,
            timestamp,
            score: entry.score,
            thumbnail: entry.thumbnail,
            data: entry.data,
        };
        entries.insert(0, serde_json::to_value(record)?);
        entries.truncate(MAX_RECORDS);
        self.save(&entries)?;

        log::debug!("added {} analysis {} to history", entry.kind, id);
        Ok(id)
    }

    /// Removes the record with the given id. Returns `false` if there is none.
    pub fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
        let mut entries = self.load()?;
        let len = entries.len();
        entries.retain(|e| entry_id(e) != Some(id));
        if entries.len() == len {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }

    /// Removes all records.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.store.remove(HISTORY_KEY)
    }

    /// Reads the stored entries without decoding them. Anything but a JSON list is logged and
    /// treated as an empty history.
    fn load(&self) -> anyhow::Result<Vec<Value>> {
        let Some(json) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(other) => {
                log::warn!("ignoring analysis history that is not a list: {}", other);
                Ok(Vec::new())
            }
            Err(e) => {
                log::warn!("ignoring corrupt analysis history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, entries: &[Value]) -> anyhow::Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(HISTORY_KEY, &json)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
