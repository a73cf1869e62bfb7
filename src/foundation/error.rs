/// Crate-wide result alias.
pub type FramepipeResult<T> = Result<T, FramepipeError>;

/// Errors surfaced by fallible setup paths (configuration, surfaces, rasterization targets).
///
/// Flow-control outcomes such as a full pipeline, a cache miss or a double submit are *not*
/// errors; they are reported through plain return values.
#[derive(thiserror::Error, Debug)]
pub enum FramepipeError {
    /// A value failed validation (e.g. a zero pipeline depth).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// An offscreen or surface raster target could not be created.
    #[error("raster error: {0}")]
    Raster(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramepipeError {
    /// Build a [`FramepipeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramepipeError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FramepipeError::Raster`].
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}
