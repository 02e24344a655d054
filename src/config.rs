//! Support for library configuration options

use std::error::Error;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tunables of the sync core.
///
/// Every field has a default, so a configuration file only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How many items the "upcoming" view shows
    pub upcoming_limit: usize,
    /// Maximum length of a title, enforced as the user types
    pub title_max_chars: usize,
    /// Maximum length of a description, enforced as the user types
    pub description_max_chars: usize,
    /// Default `env_logger` filter, used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upcoming_limit: 5,
            title_max_chars: 50,
            description_max_chars: 200,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let settings = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };
        Ok(settings)
    }

    /// Read settings from a JSON file, or use the defaults if this is not possible
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Invalid settings file: {}. Using default settings", err);
                Self::default()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "upcoming_limit": 3 }}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.upcoming_limit, 3);
        assert_eq!(settings.title_max_chars, 50);
        assert_eq!(settings.description_max_chars, 200);
    }

    #[test]
    fn missing_file() {
        let path = Path::new("/this/file/does/not/exist.json");
        assert!(Settings::from_file(path).is_err());
        assert_eq!(Settings::load_or_default(path), Settings::default());
    }
}
