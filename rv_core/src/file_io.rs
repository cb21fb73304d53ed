//! # File I/O Module
//!
//! Handles session file operations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Keep two CLI runs from writing the same session
//! - **Version validation**: Ensure schema compatibility
//! - **Lenient loading**: Malformed sections fall back to defaults
//!
//! ## File Format
//!
//! Sessions are plain JSON (`rv_session.json` by default). Lock files add a
//! `.lock` extension and record who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rv_core::file_io::{load_session_or_default, save_session, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("rv_session.json");
//! let (mut session, warnings) = load_session_or_default(path);
//! for warning in &warnings {
//!     eprintln!("{}", warning);
//! }
//!
//! session.toggle_appliance("microwave").unwrap();
//!
//! let lock = FileLock::acquire(path, "camper").unwrap();
//! save_session(&session, path).unwrap();
//! drop(lock);
//! ```

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calculations::{BatteryConfig, SolarConfig};
use crate::catalog::find_appliance;
use crate::errors::{SizingError, SizingResult};
use crate::regions::{Region, SunCondition};
use crate::session::{Session, SessionMetadata, UsageSettings, SCHEMA_VERSION};

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User name
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: machine_name(),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Recorded in a lock when no hostname source is readable
const UNKNOWN_MACHINE: &str = "unknown";

/// Locks older than this are taken over even if their process looks alive
const STALE_AFTER_HOURS: i64 = 24;

/// Name of this machine as written into lock files.
///
/// Shells export `HOSTNAME` without putting it in the environment of child
/// processes, so fall back to the kernel's own record before giving up.
fn machine_name() -> String {
    let from_env = if cfg!(windows) {
        std::env::var("COMPUTERNAME").ok()
    } else {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    };

    from_env
        .or_else(|| {
            ["/proc/sys/kernel/hostname", "/etc/hostname"]
                .iter()
                .find_map(|path| fs::read_to_string(path).ok())
        })
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_MACHINE.to_string())
}

/// Whether `pid` is running here, or `None` when this platform can't tell.
fn process_alive(pid: u32) -> Option<bool> {
    #[cfg(target_os = "linux")]
    {
        if !Path::new("/proc/self").exists() {
            return None;
        }
        Some(Path::new(&format!("/proc/{pid}")).exists())
    }
    #[cfg(windows)]
    {
        let output = std::process::Command::new("tasklist")
            .args(["/FI", &format!("PID eq {pid}"), "/NH"])
            .output()
            .ok()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Some(stdout.contains(&pid.to_string()))
    }
    #[cfg(not(any(target_os = "linux", windows)))]
    {
        let _ = pid;
        None
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata so the error can say who holds it
pub struct FileLock {
    session_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a session file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired successfully
    /// * `Err(SizingError::FileLocked)` - Another live process holds the lock
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> SizingResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(SizingError::file_locked(
                        path.display().to_string(),
                        format!(
                            "{} ({}, pid {})",
                            existing.user_id, existing.machine, existing.pid
                        ),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                tracing::warn!(
                    lock = %lock_path.display(),
                    pid = existing.pid,
                    "taking over stale lock"
                );
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| lock_error("create lock", &lock_path, e))?;

        // Non-blocking: a second CLI run fails fast instead of hanging
        lock_file.try_lock_exclusive().map_err(|_| {
            SizingError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(SizingError::serialization)?;

        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| lock_error("write lock", &lock_path, e))?;

        lock_file
            .sync_all()
            .map_err(|e| lock_error("sync lock", &lock_path, e))?;

        Ok(FileLock {
            session_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a file is locked without acquiring the lock.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }
}

fn lock_error(operation: &str, lock_path: &Path, e: std::io::Error) -> SizingError {
    SizingError::file_error(operation, lock_path.display().to_string(), e.to_string())
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `rv_session.json` -> `rv_session.json.lock`
fn lock_path_for(session_path: &Path) -> PathBuf {
    with_suffix(session_path, "lock")
}

/// Append a suffix after the existing extension
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = out
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn read_to_string(path: &Path, operation: &str) -> SizingResult<String> {
    let io_error = |e: std::io::Error| {
        SizingError::file_error(operation, path.display().to_string(), e.to_string())
    };
    let mut file = File::open(path).map_err(io_error)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(io_error)?;
    Ok(contents)
}

fn read_lock_info(lock_path: &Path) -> SizingResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(SizingError::serialization)
}

fn is_lock_stale(info: &LockInfo) -> bool {
    is_stale_for(info, &machine_name(), Utc::now())
}

/// A lock is stale when its process is gone from this machine or it is over a
/// day old. Two lock writers that both fell back to `UNKNOWN_MACHINE` are
/// treated as the same machine.
fn is_stale_for(info: &LockInfo, our_machine: &str, now: DateTime<Utc>) -> bool {
    if info.machine == our_machine && process_alive(info.pid) == Some(false) {
        return true;
    }
    (now - info.locked_at).num_hours() > STALE_AFTER_HOURS
}

/// Save a session with atomic write semantics.
///
/// 1. Serialize to pretty JSON
/// 2. Write to `<path>.tmp`
/// 3. Sync to disk (fsync)
/// 4. Rename over the target (atomic on most filesystems)
pub fn save_session(session: &Session, path: &Path) -> SizingResult<()> {
    let json = serde_json::to_string_pretty(session).map_err(SizingError::serialization)?;
    let tmp_path = with_suffix(path, "tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        SizingError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        SizingError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        SizingError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SizingError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), selections = session.selections.len(), "session saved");
    Ok(())
}

/// Load a session strictly: any malformed field is an error.
///
/// # Returns
///
/// * `Err(SizingError::VersionMismatch)` - File version is incompatible
/// * `Err(SizingError::SerializationError)` - Invalid JSON
/// * `Err(SizingError::FileError)` - I/O error
pub fn load_session(path: &Path) -> SizingResult<Session> {
    let contents = read_to_string(path, "open")?;
    let session: Session =
        serde_json::from_str(&contents).map_err(|e| SizingError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;
    validate_version(&session.meta.version)?;
    Ok(session)
}

/// Something [`load_session_or_default`] had to discard or repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadWarning {
    /// Top-level section (`solar`, `usage.microwave`, ...) or `file`
    pub section: String,
    pub message: String,
}

impl LoadWarning {
    fn new(section: impl Into<String>, message: impl Into<String>) -> Self {
        LoadWarning {
            section: section.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.section, self.message)
    }
}

/// Load a session, falling back to defaults instead of failing.
///
/// - Missing file: fresh session, no warnings
/// - Unreadable file, invalid JSON or incompatible version: fresh session
///   plus a warning
/// - Otherwise each section is read on its own, so one malformed section
///   resets to its default while the rest survive. Unknown appliance ids
///   are dropped, unknown regions reset to the default region, and a legacy
///   `sun_condition` is migrated.
pub fn load_session_or_default(path: &Path) -> (Session, Vec<LoadWarning>) {
    if !path.exists() {
        return (Session::new(), Vec::new());
    }

    let mut warnings = Vec::new();
    let value = match read_to_string(path, "open").and_then(|text| {
        serde_json::from_str::<Value>(&text).map_err(SizingError::serialization)
    }) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(_) => {
            warnings.push(LoadWarning::new("file", "Session file is not a JSON object"));
            return finish(Session::new(), warnings);
        }
        Err(e) => {
            warnings.push(LoadWarning::new("file", e.to_string()));
            return finish(Session::new(), warnings);
        }
    };

    let session = session_from_value(&value, &mut warnings);
    finish(session, warnings)
}

fn finish(session: Session, warnings: Vec<LoadWarning>) -> (Session, Vec<LoadWarning>) {
    for warning in &warnings {
        tracing::warn!(section = %warning.section, "{}", warning.message);
    }
    (session, warnings)
}

fn session_from_value(value: &Value, warnings: &mut Vec<LoadWarning>) -> Session {
    let meta: SessionMetadata = section(value, "meta", warnings).unwrap_or_default();
    if let Err(e) = validate_version(&meta.version) {
        warnings.push(LoadWarning::new("meta", e.to_string()));
        return Session::new();
    }

    let mut session = Session::new();
    session.meta = meta;
    session.selections.clear();
    session.usage.clear();

    let selections: Vec<String> = section(value, "selections", warnings).unwrap_or_default();
    for id in selections {
        if find_appliance(&id).is_err() {
            warnings.push(LoadWarning::new(
                "selections",
                format!("Dropped unknown appliance '{}'", id),
            ));
        } else if !session.is_selected(&id) {
            session.selections.push(id);
        }
    }

    if let Some(Value::Object(entries)) = value.get("usage") {
        for (id, entry) in entries {
            if find_appliance(id).is_err() {
                warnings.push(LoadWarning::new(
                    "usage",
                    format!("Dropped unknown appliance '{}'", id),
                ));
                continue;
            }
            match serde_json::from_value::<UsageSettings>(entry.clone()) {
                Ok(usage) => {
                    session.usage.insert(id.clone(), usage.clamped());
                }
                Err(e) => warnings.push(LoadWarning::new(format!("usage.{}", id), e.to_string())),
            }
        }
    } else if value.get("usage").is_some_and(|v| !v.is_null()) {
        warnings.push(LoadWarning::new("usage", "Expected an object keyed by appliance id"));
    }

    session.solar = solar_section(value, warnings);

    session.battery = battery_section(value, warnings);

    session.charging = section(value, "charging", warnings).unwrap_or_default();
    session.completed = section(value, "completed", warnings).unwrap_or_default();
    session
}

/// Deserialize one top-level field; absent or null is `None` without a warning.
fn section<T: DeserializeOwned>(
    value: &Value,
    key: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Option<T> {
    match value.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warnings.push(LoadWarning::new(key, format!("Reset to default: {}", e)));
                None
            }
        },
    }
}

/// Solar section with region repair and legacy migration.
/// Battery fields load one at a time so a bad efficiency keeps the count.
fn battery_section(value: &Value, warnings: &mut Vec<LoadWarning>) -> BatteryConfig {
    let mut battery = BatteryConfig::default();
    match value.get("battery") {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => {
            battery.battery_count = battery_field(map, "battery_count", warnings);
            battery.inverter_efficiency = battery_field(map, "inverter_efficiency", warnings);
        }
        Some(_) => {
            warnings.push(LoadWarning::new("battery", "Expected an object, reset to default"))
        }
    }

    let (battery, notes) = battery.repaired();
    warnings.extend(notes.into_iter().map(|note| LoadWarning::new("battery", note)));
    battery
}

fn battery_field<T: DeserializeOwned>(
    map: &serde_json::Map<String, Value>,
    key: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Option<T> {
    let raw = map.get(key)?.clone();
    match serde_json::from_value::<Option<T>>(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warnings.push(LoadWarning::new(format!("battery.{}", key), e.to_string()));
            None
        }
    }
}

fn solar_section(value: &Value, warnings: &mut Vec<LoadWarning>) -> SolarConfig {
    // A legacy file may carry only a top-level sun_condition
    let mut solar = match value.get("solar") {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(v) => v.clone(),
    };

    if let Value::Object(map) = &mut solar {
        match map.get("region").cloned() {
            Some(Value::String(key)) => {
                if key.parse::<Region>().is_err() {
                    warnings.push(LoadWarning::new(
                        "solar.region",
                        format!("Unknown region '{}', using {}", key, Region::default().key()),
                    ));
                    let fallback = Region::default().key().to_string();
                    map.insert("region".to_string(), Value::String(fallback));
                }
            }
            Some(_) => {}
            None => {
                let legacy = map
                    .remove("sun_condition")
                    .or_else(|| value.get("sun_condition").cloned());
                if let Some(legacy) = legacy {
                    if let Ok(condition) = serde_json::from_value::<SunCondition>(legacy) {
                        let (region, season) = condition.migrate();
                        map.insert("region".to_string(), serde_json::json!(region));
                        map.insert("season".to_string(), serde_json::json!(season));
                        warnings.push(LoadWarning::new(
                            "solar",
                            format!(
                                "Migrated legacy sun condition to {} / {}",
                                region.key(),
                                season.key()
                            ),
                        ));
                    }
                }
            }
        }
        map.remove("sun_condition");
    }

    match serde_json::from_value::<SolarConfig>(solar) {
        Ok(config) => {
            let (config, notes) = config.repaired();
            warnings.extend(notes.into_iter().map(|note| LoadWarning::new("solar", note)));
            config
        }
        Err(e) => {
            warnings.push(LoadWarning::new("solar", format!("Reset to default: {}", e)));
            Default::default()
        }
    }
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> SizingResult<()> {
    let mismatch = || SizingError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // 0.x: a newer minor may have breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
