use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    // IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization error: {0}")]
    TomlDe(String),

    // Paths
    #[error("Invalid path '{0}': {1}")]
    InvalidPath(String, String),

    // Integrity
    #[error("Invalid content hash: {0}")]
    InvalidHash(String),

    // Capability
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("{scheme} remotes are not available in this build, recompile with `--features {feature}`")]
    MissingFeature {
        scheme: String,
        feature: &'static str,
    },

    // Remote storage
    #[error("Remote storage error: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TreeError {
    /// Wrap any backend error, keeping it reachable through `source()`.
    pub fn remote<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TreeError::Remote(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
