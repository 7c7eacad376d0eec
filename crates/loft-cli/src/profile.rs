//! The on-disk session profile.
//!
//! One JSON document per profile under `~/.loft/<name>.json` (overridable
//! with `$LOFT_PROFILE` or the global `--config` flag). Written atomically
//! with owner-only permissions.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

/// Environment variable selecting a non-default profile.
pub const PROFILE_ENV: &str = "LOFT_PROFILE";

/// Directory under the home directory holding profiles.
pub const CONFIG_DIR: &str = ".loft";

const DEFAULT_NAME: &str = "client";
const DEFAULT_LIMIT: u64 = 100;

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_ssl_verify() -> bool {
    true
}

/// The persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display username of the session.
    pub username: String,
    /// Whether to verify the controller's TLS certificate.
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,
    /// Absolute controller URL.
    pub controller: String,
    /// Opaque bearer token.
    pub token: String,
    /// Page size for listings; non-positive values fall back to 100.
    #[serde(default = "default_limit")]
    pub response_limit: u64,
}

impl Profile {
    /// A fresh profile for a controller, before login.
    #[must_use]
    pub fn new(controller: impl Into<String>, ssl_verify: bool) -> Self {
        Self {
            username: String::new(),
            ssl_verify,
            controller: controller.into(),
            token: String::new(),
            response_limit: DEFAULT_LIMIT,
        }
    }
}

/// Resolve a profile name or path to a concrete file path.
///
/// Anything containing `/` or ending in `.json` is used as a path;
/// otherwise the name resolves under `<home>/.loft/<name>.json`.
pub fn locate(name: Option<&str>) -> Result<PathBuf, CliError> {
    let name = match name {
        Some(name) => name.to_string(),
        None => env::var(PROFILE_ENV).unwrap_or_else(|_| DEFAULT_NAME.to_string()),
    };
    if name.contains('/') || name.ends_with(".json") {
        return Ok(PathBuf::from(name));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Validation("cannot determine home directory".into()))?;
    Ok(home.join(CONFIG_DIR).join(format!("{name}.json")))
}

/// Load the profile, failing with `NoSession` when absent and
/// `CorruptProfile` when unparseable.
pub fn load(name: Option<&str>) -> Result<Profile, CliError> {
    let path = locate(name)?;
    load_path(&path)
}

fn load_path(path: &Path) -> Result<Profile, CliError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(CliError::NoSession),
        Err(e) => return Err(CliError::Io(e)),
    };
    let mut profile: Profile =
        serde_json::from_str(&text).map_err(|e| CliError::CorruptProfile {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
    if profile.response_limit == 0 {
        profile.response_limit = DEFAULT_LIMIT;
    }
    debug!(path = %path.display(), "loaded profile");
    Ok(profile)
}

/// Save the profile atomically, creating the config directory with
/// owner-only permissions when needed. Returns the resolved path.
pub fn save(profile: &Profile, name: Option<&str>) -> Result<PathBuf, CliError> {
    let path = locate(name)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
        set_mode(dir, 0o700)?;
    }
    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_string_pretty(profile).map_err(|e| CliError::CorruptProfile {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    fs::write(&tmp, body)?;
    set_mode(&tmp, 0o600)?;
    fs::rename(&tmp, &path)?;
    debug!(path = %path.display(), "saved profile");
    Ok(path)
}

/// Delete the profile; a missing file is not an error.
pub fn delete(name: Option<&str>) -> Result<(), CliError> {
    let path = locate(name)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CliError::Io(e)),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile {
            username: "ada".into(),
            ssl_verify: false,
            controller: "https://loft.example.com".into(),
            token: "tok-123".into(),
            response_limit: 50,
        }
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("work.json");
        let name = path.to_string_lossy().to_string();
        let profile = sample();
        save(&profile, Some(&name)).expect("save");
        let loaded = load(Some(&name)).expect("load");
        assert_eq!(loaded, profile);
    }

    #[test]
    fn missing_profile_is_no_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let name = dir.path().join("absent.json").to_string_lossy().to_string();
        assert!(matches!(load(Some(&name)), Err(CliError::NoSession)));
    }

    #[test]
    fn garbage_profile_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("write");
        let name = path.to_string_lossy().to_string();
        assert!(matches!(load(Some(&name)), Err(CliError::CorruptProfile { .. })));
    }

    #[test]
    fn zero_limit_resets_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("p.json");
        fs::write(
            &path,
            r#"{"username":"a","controller":"http://h","token":"t","response_limit":0}"#,
        )
        .expect("write");
        let name = path.to_string_lossy().to_string();
        let profile = load(Some(&name)).expect("load");
        assert_eq!(profile.response_limit, 100);
    }

    #[test]
    fn missing_optional_fields_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("p.json");
        fs::write(&path, r#"{"username":"a","controller":"http://h","token":"t"}"#)
            .expect("write");
        let name = path.to_string_lossy().to_string();
        let profile = load(Some(&name)).expect("load");
        assert!(profile.ssl_verify);
        assert_eq!(profile.response_limit, 100);
    }

    #[test]
    fn delete_missing_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let name = dir.path().join("absent.json").to_string_lossy().to_string();
        assert!(delete(Some(&name)).is_ok());
    }

    #[test]
    fn locate_treats_paths_and_names_differently() {
        let by_path = locate(Some("/tmp/x.json")).expect("path");
        assert_eq!(by_path, PathBuf::from("/tmp/x.json"));
        let by_name = locate(Some("work")).expect("name");
        assert!(by_name.ends_with(".loft/work.json"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_profile_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("perm.json");
        let name = path.to_string_lossy().to_string();
        save(&sample(), Some(&name)).expect("save");
        let mode = fs::metadata(&path).expect("meta").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
