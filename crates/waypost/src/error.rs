use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaypostError {
    #[error("Gazetteer error: {0}")]
    GazetteerError(#[from] crate::gazetteer::GazetteerError),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("Ingest error: {0}")]
    Ingest(#[from] waypost_ingest::IngestError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WaypostError>;
