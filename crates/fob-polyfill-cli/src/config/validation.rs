use crate::config::PolyfillConfig;
use crate::error::{ConfigError, Result};

/// Validate an entry name; it becomes part of an output filename.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConfigError::InvalidValue {
            field: "entries".to_string(),
            value: name.to_string(),
            hint: "Entry names must be plain file stems such as \"main\"".to_string(),
        }
        .into());
    }
    Ok(())
}

impl PolyfillConfig {
    /// Validate configuration for logical consistency.
    ///
    /// Option semantics (missing `polyfills`, internal identifiers, ...) are
    /// checked by the engine itself when each entry is normalized.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ConfigError::MissingField {
                field: "entries".to_string(),
                hint: "Pass --modules or add an `entries` map to fob-polyfill.json".to_string(),
            }
            .into());
        }

        for name in self.entries.keys() {
            validate_entry_name(name)?;
        }

        if self.hash_length == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "hashLength".to_string(),
                value: "0".to_string(),
                hint: "Use a digest length of at least 1".to_string(),
            }
            .into());
        }

        if !self.library.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "library".to_string(),
                value: self.library.display().to_string(),
                hint: "Point --library at a polyfill-library `polyfills/__dist` directory".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
