//! Persisted UI preferences.
//!
//! Tables remember their page size and hidden columns between sessions.
//! [`Preferences`] is a small path-keyed JSON store with change notification
//! and optional auto-save.
//!
//! # Path-Based Access
//!
//! Keys are paths separated by `.` or `/`:
//!
//! ```
//! use carbure_select::preferences::Preferences;
//!
//! let prefs = Preferences::new();
//! prefs.set("tables.transfers.page_size", 50).unwrap();
//! prefs.set("tables/transfers/hidden", vec!["client"]).unwrap();
//!
//! let size: Option<u32> = prefs.get("tables.transfers.page_size");
//! assert_eq!(size, Some(50));
//! assert_eq!(prefs.get_or("tables.stocks.page_size", 10), 10);
//! ```
//!
//! # Persistence
//!
//! Files are written atomically (temporary file in the target directory,
//! then rename), so a crash never leaves a truncated preferences file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use carbure_core::Signal;
use carbure_core::logging::targets;

/// Errors raised while reading or writing preferences.
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    /// Reading or writing the file failed.
    #[error("Preferences I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file or a value is not valid JSON for the requested type.
    #[error("Invalid preferences data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for preferences operations.
pub type PreferencesResult<T> = std::result::Result<T, PreferencesError>;

/// A path-keyed preference store.
pub struct Preferences {
    data: RwLock<Map<String, Value>>,
    /// Emitted with the changed path after every modification.
    changed: Signal<String>,
    auto_save: RwLock<Option<PathBuf>>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}

impl Preferences {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_map(Map::new())
    }

    /// Create a store from a JSON object.
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self {
            data: RwLock::new(data),
            changed: Signal::new(),
            auto_save: RwLock::new(None),
        }
    }

    /// Signal emitted with the changed path after every modification.
    ///
    /// `clear()` emits an empty path.
    pub fn changed(&self) -> &Signal<String> {
        &self.changed
    }

    /// Save to `path` after every modification.
    pub fn set_auto_save(&self, path: impl AsRef<Path>) {
        *self.auto_save.write() = Some(path.as_ref().to_path_buf());
    }

    /// Disables auto-save.
    pub fn disable_auto_save(&self) {
        *self.auto_save.write() = None;
    }

    /// Returns true if auto-save is enabled.
    pub fn is_auto_save_enabled(&self) -> bool {
        self.auto_save.read().is_some()
    }

    /// Store a serializable value at `path`, creating intermediate objects.
    pub fn set<T: Serialize>(&self, path: &str, value: T) -> PreferencesResult<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(path, value);
        Ok(())
    }

    /// Store a raw JSON value at `path`.
    pub fn set_value(&self, path: &str, value: Value) {
        let parts = parse_path(path);
        if parts.is_empty() {
            return;
        }

        set_nested(&mut self.data.write(), &parts, value);

        self.changed.emit(path.to_string());
        self.try_auto_save();
    }

    /// Read the value at `path` as `T`.
    ///
    /// Returns `None` when the path is absent or holds another type.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let value = self.get_value(path)?;
        serde_json::from_value(value).ok()
    }

    /// Read the value at `path`, or `default`.
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get(path).unwrap_or(default)
    }

    /// The raw JSON value at `path`.
    pub fn get_value(&self, path: &str) -> Option<Value> {
        let data = self.data.read();
        get_nested(&data, &parse_path(path)).cloned()
    }

    /// Returns true if a value exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        get_nested(&self.data.read(), &parse_path(path)).is_some()
    }

    /// Remove the value at `path`, returning it.
    pub fn remove(&self, path: &str) -> Option<Value> {
        let parts = parse_path(path);
        let removed = remove_nested(&mut self.data.write(), &parts);

        if removed.is_some() {
            self.changed.emit(path.to_string());
            self.try_auto_save();
        }
        removed
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.data.write().clear();
        self.changed.emit(String::new());
        self.try_auto_save();
    }

    /// Top-level keys.
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// Returns true if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Load preferences from a JSON file.
    ///
    /// A file whose root is not an object yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> PreferencesResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => {
                tracing::warn!(target: targets::PREFERENCES, path = %path.as_ref().display(), "preferences root is not an object");
                Ok(Self::new())
            }
        }
    }

    /// Load preferences from `path`, or start empty if the file is missing.
    pub fn load_or_default(path: impl AsRef<Path>) -> PreferencesResult<Self> {
        match Self::load(&path) {
            Err(PreferencesError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            other => other,
        }
    }

    /// Save preferences as pretty-printed JSON.
    ///
    /// The file is written atomically using a temporary file and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> PreferencesResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&*self.data.read())?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| err.error)?;

        tracing::debug!(target: targets::PREFERENCES, path = %path.display(), "preferences saved");
        Ok(())
    }

    /// Save to the auto-save path, if one is set.
    pub fn sync(&self) -> PreferencesResult<()> {
        let path = self.auto_save.read().clone();
        match path {
            Some(path) => self.save(path),
            None => Ok(()),
        }
    }

    fn try_auto_save(&self) {
        if let Err(err) = self.sync() {
            tracing::error!(target: targets::PREFERENCES, error = %err, "failed to auto-save preferences");
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("keys", &self.keys())
            .field("auto_save", &*self.auto_save.read())
            .finish()
    }
}

fn parse_path(path: &str) -> Vec<&str> {
    path.split(['.', '/']).filter(|s| !s.is_empty()).collect()
}

fn get_nested<'a>(data: &'a Map<String, Value>, parts: &[&str]) -> Option<&'a Value> {
    let (first, rest) = parts.split_first()?;
    let value = data.get(*first)?;
    if rest.is_empty() {
        Some(value)
    } else {
        match value {
            Value::Object(map) => get_nested(map, rest),
            _ => None,
        }
    }
}

fn set_nested(data: &mut Map<String, Value>, parts: &[&str], value: Value) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };

    if rest.is_empty() {
        data.insert(first.to_string(), value);
        return;
    }

    let entry = data
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        // Replace scalars with a group
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(map) = entry {
        set_nested(map, rest, value);
    }
}

fn remove_nested(data: &mut Map<String, Value>, parts: &[&str]) -> Option<Value> {
    let (first, rest) = parts.split_first()?;
    if rest.is_empty() {
        data.remove(*first)
    } else {
        match data.get_mut(*first)? {
            Value::Object(map) => remove_nested(map, rest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde::Deserialize;
    use std::sync::Arc;

    #[test]
    fn test_set_get_nested() {
        let prefs = Preferences::new();
        prefs.set("tables.lots.page_size", 25).unwrap();
        prefs.set("tables/lots/order", "asc").unwrap();

        assert_eq!(prefs.get::<u32>("tables.lots.page_size"), Some(25));
        assert_eq!(prefs.get::<String>("tables.lots.order"), Some("asc".into()));
        assert!(prefs.contains("tables.lots"));
        assert_eq!(prefs.keys(), vec!["tables".to_string()]);
    }

    #[test]
    fn test_get_wrong_type_is_none() {
        let prefs = Preferences::new();
        prefs.set("page_size", "ten").unwrap();
        assert_eq!(prefs.get::<u32>("page_size"), None);
        assert_eq!(prefs.get_or("page_size", 10_u32), 10);
    }

    #[test]
    fn test_scalar_replaced_by_group() {
        let prefs = Preferences::new();
        prefs.set("tables", 1).unwrap();
        prefs.set("tables.lots.page_size", 10).unwrap();
        assert_eq!(prefs.get::<u32>("tables.lots.page_size"), Some(10));
    }

    #[test]
    fn test_remove_and_clear() {
        let prefs = Preferences::new();
        prefs.set("a.b", true).unwrap();
        prefs.set("c", false).unwrap();

        assert_eq!(prefs.remove("a.b"), Some(Value::Bool(true)));
        assert_eq!(prefs.remove("a.b"), None);

        prefs.clear();
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_changed_signal() {
        let prefs = Preferences::new();
        let paths = Arc::new(Mutex::new(Vec::new()));

        let sink = paths.clone();
        prefs.changed().connect(move |path| sink.lock().push(path.clone()));

        prefs.set("tables.lots.page_size", 10).unwrap();
        prefs.remove("missing");
        prefs.remove("tables.lots.page_size");

        assert_eq!(
            *paths.lock(),
            vec!["tables.lots.page_size".to_string(), "tables.lots.page_size".to_string()]
        );
    }

    #[test]
    fn test_save_and_load() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Columns {
            hidden: Vec<String>,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = Preferences::new();
        prefs.set("tables.lots.page_size", 100).unwrap();
        prefs
            .set("tables.lots.columns", Columns { hidden: vec!["client".into()] })
            .unwrap();
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded.get::<u32>("tables.lots.page_size"), Some(100));
        assert_eq!(
            loaded.get::<Columns>("tables.lots.columns"),
            Some(Columns { hidden: vec!["client".into()] })
        );
    }

    #[test]
    fn test_auto_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auto.json");

        let prefs = Preferences::new();
        prefs.set_auto_save(&path);
        assert!(prefs.is_auto_save_enabled());

        prefs.set("theme", "light").unwrap();
        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded.get::<String>("theme"), Some("light".into()));
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(Preferences::load(&missing), Err(PreferencesError::Io(_))));
        assert!(Preferences::load_or_default(&missing).unwrap().is_empty());

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, "{ not json").unwrap();
        assert!(matches!(Preferences::load(&invalid), Err(PreferencesError::Json(_))));
        assert!(Preferences::load_or_default(&invalid).is_err());
    }
}
