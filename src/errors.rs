use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bad {operator} pattern: {source}")]
    BadPattern {
        operator: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),
}
