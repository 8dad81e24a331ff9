use std::path::PathBuf;

use super::adapter::RoundingWidthError;
use super::schema::FeatureKind;

/// Supplied field names do not line up with the declared schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe_mismatch(.missing, .unexpected))]
pub struct SchemaMismatchError {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

fn describe_mismatch(missing: &[String], unexpected: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing fields: {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        parts.push(format!("unexpected fields: {}", unexpected.join(", ")));
    }
    if parts.is_empty() {
        return "schema mismatch".to_string();
    }
    format!("schema mismatch ({})", parts.join("; "))
}

/// A raw value could not be converted to its declared numeric type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field} expects {} value, found '{value}'", .expected.label())]
pub struct TypeCoercionError {
    pub field: String,
    pub value: String,
    pub expected: FeatureKind,
}

/// The classifier failed or produced an output outside its contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("classification failed: {reason}")]
pub struct ClassificationError {
    pub reason: String,
}

impl ClassificationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Per-request failures. None of these are retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
    #[error(transparent)]
    TypeCoercion(#[from] TypeCoercionError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

impl PipelineError {
    /// Whether the caller supplied bad input, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::SchemaMismatch(_) | PipelineError::TypeCoercion(_)
        )
    }
}

/// Startup failures reading or validating weights, scaler, or model.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid {artifact}: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
    #[error("{artifact} references columns the feature vector does not provide: {}", .columns.join(", "))]
    IncompatibleArtifact {
        artifact: &'static str,
        columns: Vec<String>,
    },
    #[error(transparent)]
    Rounding(#[from] RoundingWidthError),
}

impl ConfigLoadError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

/// Reads and parses a JSON artifact, attaching the path to any failure.
pub(crate) fn read_json_artifact<T>(path: &std::path::Path) -> Result<T, ConfigLoadError>
where
    T: serde::de::DeserializeOwned,
{
    let file = std::fs::File::open(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
        ConfigLoadError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}
