use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactScope {
    /// Cleared whenever a level is built.
    Level,
    /// Lives until the process exits.
    Session,
    /// Persisted to disk.
    Game,
}

#[derive(Debug, Error)]
pub enum FactStoreError {
    #[error("failed to read fact file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse fact file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode game facts: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write fact file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// String facts in three scopes. Only the game scope touches the disk.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    level: BTreeMap<String, String>,
    session: BTreeMap<String, String>,
    game: BTreeMap<String, String>,
    game_path: Option<PathBuf>,
}

impl FactStore {
    /// In-memory store; game facts are never written.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads game facts from `path`. A missing file starts an empty store bound to it.
    pub fn load(path: &Path) -> Result<Self, FactStoreError> {
        let game = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| FactStoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(FactStoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        debug!(path = %path.display(), count = game.len(), "game_facts_loaded");
        Ok(Self {
            game,
            game_path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    pub fn game_path(&self) -> Option<&Path> {
        self.game_path.as_deref()
    }

    pub fn get(&self, scope: FactScope, key: &str) -> Option<&str> {
        self.scope(scope).get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, scope: FactScope, key: &str, default: &'a str) -> &'a str {
        self.get(scope, key).unwrap_or(default)
    }

    /// Game-scope writes are flushed immediately; a failed flush keeps the value in memory.
    pub fn set(&mut self, scope: FactScope, key: &str, value: &str) {
        let map = match scope {
            FactScope::Level => &mut self.level,
            FactScope::Session => &mut self.session,
            FactScope::Game => &mut self.game,
        };
        map.insert(key.to_string(), value.to_string());
        if scope == FactScope::Game {
            if let Err(error) = self.save() {
                warn!(key, error = %error, "game_fact_persist_failed");
            }
        }
    }

    pub fn clear_level(&mut self) {
        self.level.clear();
    }

    pub fn save(&self) -> Result<(), FactStoreError> {
        let Some(path) = self.game_path.as_deref() else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&self.game).map_err(FactStoreError::Encode)?;
        write_text_atomic(path, &text).map_err(|source| FactStoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn scope(&self, scope: FactScope) -> &BTreeMap<String, String> {
        match scope {
            FactScope::Level => &self.level,
            FactScope::Session => &self.session,
            FactScope::Game => &self.game,
        }
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("facts.json");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}
