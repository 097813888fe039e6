//! Central error handling for the gravlens renderer
//!
//! Provides a unified RenderError enum matching the driver's failure
//! surface. Out-of-range parameters are not errors: camera, ODE and
//! quality setters clamp silently.

/// Centralized error type for all renderer operations
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),

    #[error("resource creation failed: {0}")]
    ResourceCreation(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),

    #[error("texture load failed: {0}")]
    TextureLoad(String),

    #[error("device lost: {0}")]
    DeviceLost(String),

    #[error("readback failed: {0}")]
    Readback(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Convenience constructors for common error types
    pub fn unsupported_device<T: ToString>(msg: T) -> Self {
        RenderError::UnsupportedDevice(msg.to_string())
    }

    pub fn resource<T: ToString>(msg: T) -> Self {
        RenderError::ResourceCreation(msg.to_string())
    }

    pub fn shader<T: ToString>(msg: T) -> Self {
        RenderError::ShaderCompilation(msg.to_string())
    }

    pub fn texture<T: ToString>(msg: T) -> Self {
        RenderError::TextureLoad(msg.to_string())
    }

    pub fn device_lost<T: ToString>(msg: T) -> Self {
        RenderError::DeviceLost(msg.to_string())
    }

    pub fn readback<T: ToString>(msg: T) -> Self {
        RenderError::Readback(msg.to_string())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::TextureLoad(err.to_string())
    }
}

/// Result type alias for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;
