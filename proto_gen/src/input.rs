//! Loading resolved schema trees from disk.
//!
//! The textual schema language and its parser live upstream; what arrives
//! here is the already-resolved tree, serialized as YAML or JSON.

use std::path::Path;

use proto_types::Schema;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read schema file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML schema '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("failed to parse JSON schema '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema file '{path}' has an unsupported extension (expected .yaml, .yml or .json)")]
    UnknownExtension { path: String },
}

/// Load a resolved schema tree from a `.yaml`/`.yml` or `.json` file.
pub fn load_schema(path: &Path) -> Result<Schema, InputError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: display.clone(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "yaml" | "yml" => serde_yml::from_str(&text).map_err(|source| InputError::Yaml {
            path: display,
            source,
        }),
        "json" => serde_json::from_str(&text).map_err(|source| InputError::Json {
            path: display,
            source,
        }),
        _ => Err(InputError::UnknownExtension { path: display }),
    }
}
