//! Scene construction errors.

use thiserror::Error;

/// Errors raised while building a scene.
///
/// The renderer itself never fails; everything that could poison the
/// recursion with NaNs is rejected here instead.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Color component {value} out of range [0, 1]")]
    InvalidColor { value: f32 },

    #[error("Metal fuzz {0} out of range [0, 1]")]
    InvalidFuzz(f32),

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while setting up the progressive renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
