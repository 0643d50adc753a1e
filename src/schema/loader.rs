//! Schema document loading and saving
//!
//! Documents are JSON and live inside the working root like any other
//! table file.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::datasource::PathResolver;
use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// Reads and writes schema documents under a working root.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    resolver: PathResolver,
}

impl SchemaLoader {
    pub fn new(working_root: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(working_root),
        }
    }

    pub fn working_root(&self) -> &Path {
        self.resolver.root()
    }

    /// Parses a schema document.
    pub fn parse(json: &str) -> SchemaResult<Schema> {
        serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed_schema("<in-memory>", format!("Invalid JSON: {}", e)))
    }

    /// Renders a schema document as pretty-printed JSON.
    pub fn to_json(schema: &Schema) -> SchemaResult<String> {
        serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_schema("<in-memory>", format!("Failed to serialize schema: {}", e))
        })
    }

    /// Loads the schema document at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> SchemaResult<Schema> {
        let resolved = self.resolver.resolve(path.as_ref())?;
        let display = resolved.as_path().display().to_string();

        let mut content = String::new();
        resolved
            .open()
            .and_then(|mut file| file.read_to_string(&mut content))
            .map_err(|e| SchemaError::malformed_schema(&display, format!("Failed to read file: {}", e)))?;

        let schema: Schema = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(&display, format!("Invalid schema document: {}", e))
        })?;

        let fields = schema.fields().len().to_string();
        log_event_with_fields(
            Event::SchemaLoaded,
            &[("fields", fields.as_str()), ("path", display.as_str())],
        );
        Ok(schema)
    }

    /// Saves `schema` to `path`, replacing any existing document.
    pub fn save(&self, schema: &Schema, path: impl AsRef<Path>) -> SchemaResult<PathBuf> {
        let content = Self::to_json(schema)?;
        let resolved = self.resolver.resolve(path.as_ref())?;
        let display = resolved.as_path().display().to_string();
        let write_failed =
            |e: std::io::Error| SchemaError::malformed_schema(&display, format!("Failed to write file: {}", e));

        let mut staged = resolved.stage().map_err(write_failed)?;
        staged
            .file()
            .write_all(content.as_bytes())
            .and_then(|_| staged.file().write_all(b"\n"))
            .map_err(write_failed)?;
        let target = staged.commit().map_err(write_failed)?;

        log_event_with_fields(Event::SchemaSaved, &[("path", display.as_str())]);
        Ok(target)
    }

    /// Whether a document exists at `path` inside the root
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.resolver
            .resolve(path.as_ref())
            .map(|resolved| fs::metadata(resolved.as_path()).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::schema::SchemaErrorCode;
    use tempfile::TempDir;

    fn sample_schema() -> Schema {
        Schema::new(vec![Field::integer("id"), Field::string("name")])
            .unwrap()
            .with_primary_key(vec!["id".into()])
            .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let path = loader.save(&sample_schema(), "schemas/people.json").unwrap();
        assert!(path.exists());
        assert!(loader.exists("schemas/people.json"));

        let loaded = loader.load("schemas/people.json").unwrap();
        assert_eq!(loaded.headers(), vec!["id".to_string(), "name".to_string()]);
        assert_eq!(loaded.primary_key(), ["id".to_string()].as_slice());
    }

    #[test]
    fn test_malformed_document() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{ not json").unwrap();

        let loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load("bad.json").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::TableSchemaMalformed);
    }

    #[test]
    fn test_missing_document() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());
        assert!(!loader.exists("absent.json"));
        assert!(loader.load("absent.json").is_err());
    }

    #[test]
    fn test_paths_outside_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let err = loader.load("../outside.json").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::TablePathRejected);
        assert!(loader.save(&sample_schema(), "../outside.json").is_err());
    }

    #[test]
    fn test_parse_in_memory() {
        let schema = SchemaLoader::parse(r#"{"fields": [{"name": "a", "type": "year"}]}"#).unwrap();
        assert_eq!(schema.fields()[0].field_type.type_name(), "year");
        assert!(SchemaLoader::parse(r#"{"fields": 3}"#).is_err());
    }
}
