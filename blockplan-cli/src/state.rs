use anyhow::{Context, Result};
use blockplan_core::{ScheduleEntry, ScheduleStore, Task, TimeSlot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `$BLOCKPLAN_HOME`, else `~/.blockplan`.
pub fn blockplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BLOCKPLAN_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".blockplan"))
}

pub fn ensure_blockplan_home() -> Result<PathBuf> {
    let dir = blockplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// File-backed store: one directory per user holding `tasks.json`,
/// `slots.json` and the last `schedule.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(ensure_blockplan_home()?.join("users")))
    }

    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(user_id)
    }

    pub fn schedule_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("schedule.json")
    }

    fn read_list<T: DeserializeOwned>(&self, user_id: &str, file: &str) -> Result<Vec<T>> {
        let p = self.user_dir(user_id).join(file);
        if !p.exists() {
            debug!(path = %p.display(), "no file; treating as empty");
            return Ok(Vec::new());
        }
        read_json(&p)
    }
}

impl ScheduleStore for JsonFileStore {
    fn load_pending_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.read_list(user_id, "tasks.json")
    }

    fn load_available_slots(&self, user_id: &str) -> Result<Vec<TimeSlot>> {
        self.read_list(user_id, "slots.json")
    }

    fn save_schedule(&mut self, user_id: &str, schedule: &[ScheduleEntry]) -> Result<()> {
        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        write_json(&self.schedule_path(user_id), schedule)
    }
}
