use thiserror::Error;

/// Errors emitted by profile handling and the generation engine.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid profile: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile parse error: {0}")]
    ProfileParse(#[from] toml::de::Error),
    #[error("profile encode error: {0}")]
    ProfileEncode(#[from] toml::ser::Error),
}
