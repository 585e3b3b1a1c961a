/// Process-level failure: a message plus the exit code the binary returns.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the ETL itself.
///
/// `Configuration` and `Validation` abort a run before any series is touched.
/// The remaining variants are per-series: the batch records them against the
/// offending series and carries on.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("Unknown series '{0}'.")]
    UnknownSeries(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EtlError {
    pub fn exit_code(&self) -> u8 {
        match self {
            EtlError::Configuration(_) | EtlError::Validation(_) | EtlError::UnknownSeries(_) => 2,
            EtlError::Upstream(_) => 4,
            EtlError::Store(_) => 5,
        }
    }
}

impl From<EtlError> for AppError {
    fn from(err: EtlError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

/// The data provider could not deliver observations for a series.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("FRED API error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("FRED request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid FRED payload: {0}")]
    Payload(String),
}

impl UpstreamError {
    /// HTTP status of a non-success response, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Transport(err) => err.status().map(|s| s.as_u16()),
            UpstreamError::Payload(_) => None,
        }
    }
}

/// Schema, read or write failure against the warehouse.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to start database runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("Relation {0} does not exist.")]
    MissingTable(&'static str),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Store unavailable during {0}.")]
    Unavailable(&'static str),
}
