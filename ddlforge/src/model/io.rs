//! Model serialization glue
//!
//! The engine does not mandate a wire format; these helpers read and write
//! the model as JSON or YAML documents, keyed by file extension. They sit
//! at the collaborator boundary and carry no schema logic of their own.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Database;

/// Read a database model from a JSON or YAML file
pub fn read_database(path: &Path) -> Result<Database> {
    let content = fs::read_to_string(path)?;
    match extension(path).as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        other => Err(Error::ConfigError(format!(
            "unsupported model format '{}', expected json or yaml",
            other
        ))),
    }
}

/// Write a database model to a JSON or YAML file
pub fn write_database(database: &Database, path: &Path) -> Result<()> {
    let content = match extension(path).as_str() {
        "json" => serde_json::to_string_pretty(database)?,
        "yaml" | "yml" => serde_yaml::to_string(database)?,
        other => {
            return Err(Error::ConfigError(format!(
                "unsupported model format '{}', expected json or yaml",
                other
            )))
        }
    };
    fs::write(path, content)?;
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}
