//! # Config Loader
//!
//! Locates and reads configuration files. Parsing is left to the caller,
//! which keeps this crate independent of any one format.
//!
//! ```no_run
//! use config_loader::{find_config_file, load_config_file};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = find_config_file("voip.json")?;
//!     let text = load_config_file(&path)?;
//!     println!("{} bytes of configuration", text.len());
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the search for a configuration file.
pub const CONFIG_PATH_ENV: &str = "VOIP_CONFIG_PATH";

/// Reads the whole file at `path` into a string.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
}

/// Finds `filename` in the usual places.
///
/// Search order:
/// 1. the file named by `VOIP_CONFIG_PATH`, when set and present
/// 2. `./config/{filename}`
/// 3. `./{filename}`
pub fn find_config_file(filename: &str) -> Result<PathBuf> {
    let override_path = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    find_in(override_path, Path::new("."), filename)
}

fn find_in(override_path: Option<PathBuf>, base: &Path, filename: &str) -> Result<PathBuf> {
    if let Some(path) = override_path.filter(|p| p.is_file()) {
        return Ok(path);
    }

    let candidates = [base.join("config").join(filename), base.join(filename)];
    if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
        return Ok(found);
    }

    Err(ConfigError::FileNotFound(format!(
        "'{}' (searched ${}, ./config/{}, ./{})",
        filename, CONFIG_PATH_ENV, filename, filename
    )))
}

/// [`find_config_file`] followed by [`load_config_file`].
pub fn find_and_load(filename: &str) -> Result<String> {
    let path = find_config_file(filename)?;
    load_config_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_config_file(dir.path()),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voip.json");
        fs::write(&path, "{\"media\":{}}").unwrap();

        assert_eq!(load_config_file(&path).unwrap(), "{\"media\":{}}");
    }

    #[test]
    fn test_find_prefers_config_subdirectory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config").join("voip.json"), "a").unwrap();
        fs::write(dir.path().join("voip.json"), "b").unwrap();

        let found = find_in(None, dir.path(), "voip.json").unwrap();
        assert!(found.ends_with("config/voip.json"));
    }

    #[test]
    fn test_find_uses_override_when_present() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("custom.json");
        fs::write(&custom, "{}").unwrap();
        fs::write(dir.path().join("voip.json"), "{}").unwrap();

        let found = find_in(Some(custom.clone()), dir.path(), "voip.json").unwrap();
        assert_eq!(found, custom);
    }

    #[test]
    fn test_find_ignores_missing_override() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("voip.json"), "{}").unwrap();

        let found = find_in(Some(dir.path().join("gone.json")), dir.path(), "voip.json").unwrap();
        assert!(found.ends_with("voip.json"));
    }

    #[test]
    fn test_find_nonexistent_file() {
        let dir = tempdir().unwrap();
        let err = find_in(None, dir.path(), "voip.json").unwrap_err();
        assert!(err.to_string().contains("VOIP_CONFIG_PATH"));
    }
}
