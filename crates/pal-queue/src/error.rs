#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("sqlite error: {source}")]
    Sql {
        #[from]
        source: rusqlite::Error,
    },
    #[error("timestamp parse error for value '{value}': {source}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("unknown task status '{value}' in store")]
    UnknownStatus { value: String },
    #[error("invalid task level {value} in store")]
    InvalidLevel { value: i64 },
    #[error("task queue lock poisoned")]
    Poisoned,
    #[error("task store unavailable: {message}")]
    Unavailable { message: String },
}
