use thiserror::Error;

#[derive(Debug, Error)]
pub enum PagePackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },
    #[error("Nothing to pack")]
    Empty,
    #[error("Render error: {0}")]
    Render(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, PagePackerError>;
