use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Failed to prepare statement: {0}")]
    Prepare(String),

    #[error("Failed to step statement: {0}")]
    Step(String),

    #[error("Failed to bind parameter: {0}")]
    Bind(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Type mapping error: {0}")]
    TypeMapping(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// The engine message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            QueryError::Open(msg)
            | QueryError::Prepare(msg)
            | QueryError::Step(msg)
            | QueryError::Bind(msg)
            | QueryError::Connection(msg)
            | QueryError::Query(msg)
            | QueryError::TypeMapping(msg)
            | QueryError::UnknownColumn(msg) => msg.clone(),
            QueryError::Json(err) => err.to_string(),
        }
    }
}
