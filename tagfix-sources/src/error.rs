use camino::Utf8PathBuf;
use tagfix_types::DatabaseParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("io error reading {path}: {message}")]
    Io { path: Utf8PathBuf, message: String },

    #[error("json parse error in {path}: {message}")]
    Json { path: Utf8PathBuf, message: String },

    #[error("{path}:{line_no}: malformed popcon line '{line}'")]
    Popcon {
        path: Utf8PathBuf,
        line_no: usize,
        line: String,
    },

    #[error("tag {tag} refers to unknown facet {facet}")]
    UnknownFacet { tag: String, facet: String },

    #[error("tag database {path}: {source}")]
    TagDatabase {
        path: Utf8PathBuf,
        #[source]
        source: DatabaseParseError,
    },
}

impl SourceLoadError {
    pub(crate) fn io(path: &camino::Utf8Path, e: std::io::Error) -> Self {
        SourceLoadError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    pub(crate) fn json(path: &camino::Utf8Path, e: serde_json::Error) -> Self {
        SourceLoadError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }
}
