//! Small persisted key/value store for preferences and cached snapshots.
//!
//! Every key lives in its own JSON file under the data directory. Reads
//! are best-effort: a missing, unreadable or corrupt file reads as absent.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use mapvote_common::{utils::time::current_timestamp, Error, Result, StatsSnapshot};

use crate::i18n::Language;

pub const LANG_KEY: &str = "lang";
pub const STATS_CACHE_KEY: &str = "bd_stats_cache_v1";

/// Last good aggregate snapshot plus when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedStats {
    pub saved_at: i64,
    pub snapshot: StatsSnapshot,
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    dir: PathBuf,
}

impl PreferenceStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("cannot open {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!("No stored value for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Ignoring corrupt value for {}: {}", key, e);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let path = self.path(key);
        fs::write(&path, json)
            .map_err(|e| Error::Storage(format!("cannot write {}: {}", path.display(), e)))?;
        Ok(())
    }

    pub fn language(&self) -> Language {
        self.get(LANG_KEY).unwrap_or_default()
    }

    pub fn set_language(&self, lang: Language) -> Result<()> {
        self.set(LANG_KEY, &lang)
    }

    pub fn cached_stats(&self) -> Option<CachedStats> {
        self.get(STATS_CACHE_KEY)
    }

    pub fn cache_stats(&self, snapshot: &StatsSnapshot) -> Result<()> {
        let entry = CachedStats {
            saved_at: current_timestamp(),
            snapshot: snapshot.clone(),
        };
        self.set(STATS_CACHE_KEY, &entry)
    }
}
