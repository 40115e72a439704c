use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Fetch or parse failure during ingestion. No article is stored.
    #[error("failed to fetch URL: {0}")]
    Extraction(String),

    /// Script synthesis failure during generation. No state is mutated.
    #[error("script synthesis failed: {0}")]
    Synthesis(String),

    /// Audio rendering failure during generation. No state is mutated.
    #[error("audio rendering failed: {0}")]
    Render(String),

    #[error("no processed articles in the queue")]
    NothingToProcess,

    #[error("{kind} not found: id {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn article_not_found(id: i64) -> Self {
        AppError::NotFound { kind: "article", id }
    }

    pub fn podcast_not_found(id: i64) -> Self {
        AppError::NotFound { kind: "podcast", id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_and_statement_errors_read_differently() {
        let database = AppError::Database(tokio_rusqlite::Error::ConnectionClosed);
        let sqlite = AppError::Sqlite(rusqlite::Error::QueryReturnedNoRows);

        assert!(database.to_string().starts_with("database error:"));
        assert!(sqlite.to_string().starts_with("sqlite error:"));
    }
}
