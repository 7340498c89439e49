use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("render failed: {0}")]
    Render(String),
    #[error("render worker failed: {0}")]
    Worker(String),
}

impl VisualizationError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<tokio::task::JoinError> for VisualizationError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VisualizationError>;
