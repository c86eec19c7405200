use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use super::Schema;

const EMBEDDED_SCHEMA: &str = include_str!("../../assets/sample_schema.json");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schema JSON from {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("model #{index} has an empty name")]
    EmptyModelName { index: usize },
    #[error("model {0} is declared more than once")]
    DuplicateModel(String),
}

#[derive(Clone, Debug)]
pub enum SchemaSource {
    Embedded,
    File(PathBuf),
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("built-in sample"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn load_schema(source: &SchemaSource) -> Result<Schema, SchemaError> {
    let raw = match source {
        SchemaSource::Embedded => EMBEDDED_SCHEMA.to_owned(),
        SchemaSource::File(path) => fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.clone(),
            source,
        })?,
    };

    let schema = parse_schema(&raw, &source.to_string())?;
    info!(
        source = %source,
        models = schema.models.len(),
        relations = schema.relation_count(),
        "schema loaded"
    );
    Ok(schema)
}

pub(super) fn parse_schema(raw: &str, origin: &str) -> Result<Schema, SchemaError> {
    let schema: Schema = serde_json::from_str(raw).map_err(|source| SchemaError::Parse {
        origin: origin.to_owned(),
        source,
    })?;
    validate(&schema)?;
    Ok(schema)
}

fn validate(schema: &Schema) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(schema.models.len());
    for (index, model) in schema.models.iter().enumerate() {
        if model.name.trim().is_empty() {
            return Err(SchemaError::EmptyModelName { index });
        }
        if !seen.insert(model.name.as_str()) {
            return Err(SchemaError::DuplicateModel(model.name.clone()));
        }
    }
    Ok(())
}
