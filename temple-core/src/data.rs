//! Data loader: decodes the optional data file bound to a template build.
//!
//! No path means no data: the result is [`Value::Null`]. Files ending in
//! `.yaml` or `.yml` are decoded as YAML, everything else as JSON.

use std::path::Path;

use serde_json::Value;

use crate::error::DataError;

/// Decoding format of a data file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DataFormat::Yaml
            }
            _ => DataFormat::Json,
        }
    }
}

/// Load and decode the data file at `path`.
pub fn load(path: Option<&Path>) -> Result<Value, DataError> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };

    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    decode(path, &raw)
}

fn decode(path: &Path, raw: &str) -> Result<Value, DataError> {
    match DataFormat::for_path(path) {
        DataFormat::Json => serde_json::from_str(raw).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        }),
        DataFormat::Yaml => serde_yaml::from_str(raw).map_err(|source| DataError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}
