//! JSON Schema files for configuration types.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use schemars::{JsonSchema, schema::RootSchema, schema_for};
use thiserror::Error;

/// A generated schema and the identifier used for its file name.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub id: String,
    pub schema: RootSchema,
}

impl SchemaEntry {
    /// Generate the schema for `T`.
    ///
    /// The identifier is the schema name in kebab case, so `FormatSettings`
    /// is written to `format-settings.json`.
    #[must_use]
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            id: kebab_case(&T::schema_name()),
            schema: schema_for!(T),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to create schema directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialise schema {id}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write schema file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write each entry to `<dir>/<id>.json`, creating `dir` if needed.
///
/// Stops at the first failure; files already written are left in place.
///
/// # Errors
/// Returns [`SchemaError`] if the directory cannot be created or a schema
/// cannot be serialised or written.
pub fn write_schemas(dir: &Path, entries: &[SchemaEntry]) -> Result<Vec<PathBuf>, SchemaError> {
    fs::create_dir_all(dir).map_err(|source| SchemaError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut json =
            serde_json::to_string_pretty(&entry.schema).map_err(|source| SchemaError::Serialize {
                id: entry.id.clone(),
                source,
            })?;
        json.push('\n');
        let path = dir.join(entry.file_name());
        fs::write(&path, json).map_err(|source| SchemaError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote schema");
        written.push(path);
    }
    Ok(written)
}

fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = prev.is_some_and(|p| {
                p.is_lowercase()
                    || p.is_ascii_digit()
                    || (p.is_uppercase() && next.is_some_and(|n| n.is_lowercase()))
            });
            if boundary {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c == '_' || c == ' ' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}
