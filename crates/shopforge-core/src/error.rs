use thiserror::Error;

/// Errors raised while validating or traversing the entity catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog: {0}")]
    Invalid(String),
    #[error("foreign key cycle involving tables: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
