#![forbid(unsafe_code)]

//! Shared error type for configuration loading.
//!
//! Config structs in `panelstack-nav` and `panelstack-recycler` load from
//! TOML or JSON when the `config-files` feature is enabled; all of them
//! report failures through [`ConfigError`].

use thiserror::Error;

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),
    /// The document could not be parsed.
    #[error("config {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
    /// The document parsed but holds out-of-range values.
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Parse a JSON document.
#[cfg(feature = "config-files")]
pub fn from_json_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    serde_json::from_str(s).map_err(|err| ConfigError::Parse {
        format: "JSON",
        message: err.to_string(),
    })
}

/// Parse a TOML document.
#[cfg(feature = "config-files")]
pub fn from_toml_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    toml::from_str(s).map_err(|err| ConfigError::Parse {
        format: "TOML",
        message: err.to_string(),
    })
}

/// Read and parse a JSON file.
#[cfg(feature = "config-files")]
pub fn from_json_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<std::path::Path>,
) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    from_json_str(&content)
}

/// Read and parse a TOML file.
#[cfg(feature = "config-files")]
pub fn from_toml_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<std::path::Path>,
) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn invalid_joins_messages() {
        let err = ConfigError::Invalid(vec!["a must be > 0".into(), "b too big".into()]);
        assert_eq!(err.to_string(), "invalid config: a must be > 0; b too big");
    }

    #[test]
    fn io_error_has_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ConfigError::from(io);
        assert!(err.to_string().contains("missing"));
        assert!(StdError::source(&err).is_some());
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn json_parse_error_is_reported() {
        let result: Result<Vec<u32>, _> = from_json_str("[1, 2,");
        assert!(matches!(
            result,
            Err(ConfigError::Parse { format: "JSON", .. })
        ));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_roundtrip_value() {
        #[derive(serde::Deserialize)]
        struct Doc {
            name: String,
        }
        let doc: Doc = from_toml_str("name = \"stack\"").expect("parse");
        assert_eq!(doc.name, "stack");
    }
}
