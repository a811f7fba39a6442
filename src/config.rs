//! Loader configuration.
//!
//! Settings that influence how a header's companion raster is located and
//! decoded. The configuration can be exported to and imported from JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BRIGHTNESS_MULTIPLIER, KNOWN_EXTENSIONS};
use crate::error::{CrismError, Result};

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Byte order of the elements in the binary raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least significant byte first (ENVI `byte order = 0`)
    #[default]
    Little,
    /// Most significant byte first (ENVI `byte order = 1`)
    Big,
}

impl ByteOrder {
    /// Map an ENVI `byte order` code to a byte order.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ByteOrder::Little),
            1 => Some(ByteOrder::Big),
            _ => None,
        }
    }

    /// Get the display name for this byte order.
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::Little => "little endian",
            ByteOrder::Big => "big endian",
        }
    }
}

/// Loader configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Binary file extensions (with leading dot, lowercase) that may be loaded
    #[serde(default = "default_known_extensions")]
    pub known_extensions: Vec<String>,

    /// Multiplier used by `composite_default`
    #[serde(default = "default_brightness_multiplier")]
    pub brightness_multiplier: f32,

    /// Reject binaries whose size differs from the declared shape
    #[serde(default = "default_verify_file_size")]
    pub verify_file_size: bool,

    /// Byte order used when the header has no `byte order` field
    #[serde(default)]
    pub default_byte_order: ByteOrder,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_known_extensions() -> Vec<String> {
    KNOWN_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_brightness_multiplier() -> f32 {
    DEFAULT_BRIGHTNESS_MULTIPLIER
}

fn default_verify_file_size() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            known_extensions: default_known_extensions(),
            brightness_multiplier: default_brightness_multiplier(),
            verify_file_size: default_verify_file_size(),
            default_byte_order: ByteOrder::default(),
        }
    }
}

impl LoaderConfig {
    /// Import a configuration from JSON.
    ///
    /// Missing fields take their defaults. A config written by a newer
    /// format version is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoaderConfig = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(CrismError::UnsupportedConfigVersion {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }
        log::debug!("Loaded loader config (version {})", config.version);
        Ok(config)
    }

    /// Export this configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check whether an extension (with leading dot) is accepted, ignoring case.
    pub fn is_known_extension(&self, extension: &str) -> bool {
        let lower = extension.to_lowercase();
        self.known_extensions
            .iter()
            .any(|known| known.to_lowercase() == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.known_extensions, vec![".img".to_string()]);
        assert!((config.brightness_multiplier - 5.0).abs() < f32::EPSILON);
        assert!(config.verify_file_size);
        assert_eq!(config.default_byte_order, ByteOrder::Little);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = LoaderConfig {
            brightness_multiplier: 2.5,
            default_byte_order: ByteOrder::Big,
            ..LoaderConfig::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"big\""));

        let parsed = LoaderConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = LoaderConfig::from_json(r#"{ "verify_file_size": false }"#).unwrap();
        assert!(!parsed.verify_file_size);
        assert_eq!(parsed.known_extensions, vec![".img".to_string()]);
        assert_eq!(parsed.version, CONFIG_VERSION);
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = LoaderConfig::from_json(r#"{ "version": 99 }"#);
        assert!(matches!(
            result,
            Err(CrismError::UnsupportedConfigVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_known_extension_is_case_insensitive() {
        let config = LoaderConfig::default();
        assert!(config.is_known_extension(".img"));
        assert!(config.is_known_extension(".IMG"));
        assert!(!config.is_known_extension(".lbl"));
    }

    #[test]
    fn test_byte_order_codes() {
        assert_eq!(ByteOrder::from_code(0), Some(ByteOrder::Little));
        assert_eq!(ByteOrder::from_code(1), Some(ByteOrder::Big));
        assert_eq!(ByteOrder::from_code(2), None);
    }
}
