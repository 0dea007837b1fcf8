//! Settings Persistence System
//!
//! Kit settings stored as pretty JSON in `{data_dir}/settings.json`.
//! Writers hold an advisory lock and replace the file through a temp file;
//! single values are addressed by dotted keys such as `arrange.spacing`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::{
    i18n::{flatten, unflatten},
    CoreError, CoreResult, DEFAULT_LOCALE,
};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "blockkit";

/// Largest accepted arrange spacing
const MAX_SPACING: f32 = 10_000.0;

/// Largest accepted grid column count
const MAX_GRID_COLUMNS: u32 = 256;

/// Kit settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KitSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// Defaults for the arrange commands
    #[serde(default)]
    pub arrange: ArrangeSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for KitSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            general: GeneralSettings::default(),
            logging: LoggingSettings::default(),
            arrange: ArrangeSettings::default(),
        }
    }
}

impl KitSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Bad values are corrected instead of rejected, so an old or hand-edited
    /// file still loads.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        let locale = self.general.locale.trim();
        self.general.locale = if locale.is_empty() {
            default_locale()
        } else {
            locale.to_string()
        };

        self.logging.level = normalize_enum(
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
            default_log_level(),
        );

        self.arrange.spacing = clamp_f32(self.arrange.spacing, 0.0, MAX_SPACING);
        // 0 means "auto".
        self.arrange.grid_columns = self.arrange.grid_columns.min(MAX_GRID_COLUMNS);
    }

    /// Settings as dotted keys (`arrange.gridColumns`) in camelCase
    pub fn entries(&self) -> CoreResult<BTreeMap<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(object) => Ok(flatten(&object)),
            _ => Err(CoreError::Internal("settings did not serialize to an object".into())),
        }
    }

    /// Sets one dotted key from its textual form, then normalizes.
    ///
    /// String settings take `raw` verbatim; others parse it as JSON.
    pub fn set_value(&mut self, key: &str, raw: &str) -> CoreResult<()> {
        let mut entries = self.entries()?;
        let current = entries
            .get(key)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown setting: {}", key)))?;

        let value = match current {
            Value::String(_) => Value::String(raw.to_string()),
            _ => serde_json::from_str(raw).map_err(|_| {
                CoreError::ValidationError(format!("Invalid value for {}: {}", key, raw))
            })?,
        };
        entries.insert(key.to_string(), value);

        let mut updated: KitSettings = serde_json::from_value(Value::Object(unflatten(&entries)))
            .map_err(|e| CoreError::ValidationError(format!("Invalid value for {}: {}", key, e)))?;
        updated.normalize();
        *self = updated;
        Ok(())
    }
}

fn clamp_f32(value: f32, min: f32, max: f32) -> f32 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

fn normalize_enum(value: &str, allowed: &[&str], fallback: String) -> String {
    if allowed.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        value.to_ascii_lowercase()
    } else {
        fallback
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    /// Active translation locale (e.g., "en", "de")
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSettings {
    /// Default filter level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write daily log files under the data directory
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_file: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Arrange command defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeSettings {
    /// Gap between arranged blocks
    #[serde(default = "default_spacing")]
    pub spacing: f32,

    /// Grid columns (0 = auto)
    #[serde(default)]
    pub grid_columns: u32,
}

impl Default for ArrangeSettings {
    fn default() -> Self {
        Self {
            spacing: default_spacing(),
            grid_columns: 0,
        }
    }
}

fn default_spacing() -> f32 {
    10.0
}

/// Platform data directory for the kit, if one can be determined
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Advisory lock on the settings lock file, released on drop
struct SettingsLock {
    file: fs::File,
}

impl SettingsLock {
    fn acquire(path: &Path, mode: LockMode) -> CoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        match mode {
            LockMode::Shared => fs2::FileExt::lock_shared(&file)?,
            LockMode::Exclusive => fs2::FileExt::lock_exclusive(&file)?,
        }
        Ok(Self { file })
    }
}

impl Drop for SettingsLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }
    }
}

/// Replaces `path` with `contents` via a synced temp file and a rename
fn replace_file(path: &Path, contents: &[u8]) -> CoreResult<()> {
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    let Err(rename_error) = fs::rename(&temp_path, path) else {
        return Ok(());
    };
    if !path.exists() {
        let _ = fs::remove_file(&temp_path);
        return Err(rename_error.into());
    }

    // Windows refuses to rename over an existing file: move it aside first.
    let backup_path = path.with_extension("json.bak");
    fs::rename(path, &backup_path)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::rename(&backup_path, path);
        return Err(CoreError::Internal(format!(
            "Failed to finalize settings file: {}",
            e
        )));
    }
    let _ = fs::remove_file(&backup_path);
    Ok(())
}

/// Loads, saves, edits and resets `settings.json` in one data directory
pub struct SettingsManager {
    settings_path: PathBuf,
    lock_path: PathBuf,
}

impl SettingsManager {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE),
            lock_path: data_dir.join(SETTINGS_LOCK_FILE),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Reads the file as-is; the caller holds the lock
    fn read(&self) -> CoreResult<KitSettings> {
        if !self.settings_path.exists() {
            info!("Settings file not found, using defaults");
            return Ok(KitSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)?;
        let mut settings: KitSettings = serde_json::from_str(&content)?;
        if settings.version < SETTINGS_VERSION {
            info!(
                "Migrating settings from version {} to {}",
                settings.version, SETTINGS_VERSION
            );
        }
        settings.normalize();
        Ok(settings)
    }

    /// Normalizes and writes; the caller holds the exclusive lock
    fn write(&self, settings: &KitSettings) -> CoreResult<KitSettings> {
        let mut normalized = settings.clone();
        normalized.normalize();

        let content = serde_json::to_string_pretty(&normalized)?;
        replace_file(&self.settings_path, content.as_bytes())?;

        info!("Settings saved to {:?}", self.settings_path);
        Ok(normalized)
    }

    /// Loads settings; a missing or unreadable file yields defaults
    pub fn load(&self) -> KitSettings {
        let result = SettingsLock::acquire(&self.lock_path, LockMode::Shared)
            .and_then(|_lock| self.read());

        result.unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            KitSettings::default()
        })
    }

    /// Persists `settings` and returns what was written
    pub fn save(&self, settings: &KitSettings) -> CoreResult<KitSettings> {
        let _lock = SettingsLock::acquire(&self.lock_path, LockMode::Exclusive)?;
        self.write(settings)
    }

    /// Changes one dotted setting (e.g. `arrange.spacing`) and persists it.
    ///
    /// The read and the write happen under one exclusive lock. An unreadable
    /// file is treated as defaults, like [`load`](Self::load).
    pub fn update(&self, key: &str, raw: &str) -> CoreResult<KitSettings> {
        let _lock = SettingsLock::acquire(&self.lock_path, LockMode::Exclusive)?;

        let mut settings = self.read().unwrap_or_else(|e| {
            warn!("Replacing unreadable settings file: {}", e);
            KitSettings::default()
        });
        settings.set_value(key, raw)?;
        self.write(&settings)
    }

    /// Deletes the settings file and returns the defaults
    pub fn reset(&self) -> CoreResult<KitSettings> {
        let _lock = SettingsLock::acquire(&self.lock_path, LockMode::Exclusive)?;
        if self.settings_path.exists() {
            fs::remove_file(&self.settings_path)?;
            info!("Settings file deleted");
        }
        Ok(KitSettings::default())
    }
}
