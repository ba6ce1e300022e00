use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::action::Action;
use crate::app_dirs::AppDirs;
use crate::bind::Bindings;

/// Why persisted bindings could not be used. Always recoverable by
/// re-capturing the binds interactively.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no keybinds found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read keybinds: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse keybinds: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no bind configured for {0}")]
    MissingSlot(Action),
}

pub trait ConfigStore {
    fn load(&self) -> Result<Bindings, ConfigError>;
    fn save(&self, binds: &Bindings) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Bindings, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let binds: Bindings = serde_json::from_slice(&bytes)?;
        match binds.missing() {
            Some(action) => Err(ConfigError::MissingSlot(action)),
            None => Ok(binds),
        }
    }

    fn save(&self, binds: &Bindings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(binds)?;
        fs::write(&self.path, data)?;
        log::info!("saved keybinds to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store, used headless and in tests
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    binds: std::cell::RefCell<Option<Bindings>>,
}

impl MemoryConfigStore {
    pub fn new(binds: Option<Bindings>) -> Self {
        Self {
            binds: std::cell::RefCell::new(binds),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Bindings, ConfigError> {
        let binds = self
            .binds
            .borrow()
            .clone()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("<memory>")))?;
        match binds.missing() {
            Some(action) => Err(ConfigError::MissingSlot(action)),
            None => Ok(binds),
        }
    }

    fn save(&self, binds: &Bindings) -> Result<(), ConfigError> {
        *self.binds.borrow_mut() = Some(binds.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::{Bind, MouseButtonName};
    use assert_matches::assert_matches;
    use crossterm::event::KeyCode;
    use tempfile::tempdir;

    fn full_binds() -> Bindings {
        let mut binds = Bindings::default();
        binds.set(Action::Axe, Bind::from_key_code(KeyCode::Char('1')).unwrap());
        binds.set(Action::Mace, Bind::from_key_code(KeyCode::Char('2')).unwrap());
        binds.set(Action::Attack, Bind::Mouse(MouseButtonName::Left));
        binds
    }

    #[test]
    fn roundtrip_bindings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let binds = full_binds();
        store.save(&binds).unwrap();
        assert_eq!(store.load().unwrap(), binds);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        assert_matches!(store.load(), Err(ConfigError::NotFound(_)));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_matches!(store.load(), Err(ConfigError::Parse(_)));
    }

    #[test]
    fn missing_slot_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            br#"{"axe": {"kind": "keyboard", "value": "1"},
                 "attack": {"kind": "mouse", "value": "left"}}"#,
        )
        .unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_matches!(store.load(), Err(ConfigError::MissingSlot(Action::Mace)));
    }

    #[test]
    fn unknown_mouse_button_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            br#"{"axe": {"kind": "keyboard", "value": "1"},
                 "mace": {"kind": "keyboard", "value": "2"},
                 "attack": {"kind": "mouse", "value": "x9"}}"#,
        )
        .unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_matches!(store.load(), Err(ConfigError::Parse(_)));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryConfigStore::default();
        assert_matches!(store.load(), Err(ConfigError::NotFound(_)));
        store.save(&full_binds()).unwrap();
        assert_eq!(store.load().unwrap(), full_binds());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::MissingSlot(Action::Mace).to_string(),
            "no bind configured for MACE"
        );
    }
}
