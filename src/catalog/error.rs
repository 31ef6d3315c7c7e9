use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("element source {url} unavailable: {message}")]
    SourceUnavailable { url: String, message: String },
    #[error("satellite {name:?} not found in catalog; available: {}", .available.join(", "))]
    NotFound {
        name: String,
        available: Vec<String>,
    },
    #[error("malformed element set for {object:?} (line {line}): {message}")]
    Parse {
        object: String,
        line: usize,
        message: String,
    },
}
