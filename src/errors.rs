use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the chili quality analyzer.
///
/// Each variant captures the context of its failure domain (filesystem, decoding,
/// image processing, configuration) so callers can report a precise diagnostic
/// without parsing error strings.
#[derive(Error, Debug)]
pub enum ChiliQualityError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image load error: failed to decode {path:?}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ChiliQualityError>;

impl ChiliQualityError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert anyhow errors from the image primitives to processing errors.
///
/// The primitives in `imageops` report failures through `anyhow` because they
/// carry no file context. Code that knows the path should construct
/// `ChiliQualityError::ImageProcessing` directly.
impl From<anyhow::Error> for ChiliQualityError {
    fn from(err: anyhow::Error) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image operation".to_string(),
            source: err.into(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Fallback for I/O failures without specific path/operation context.
impl From<std::io::Error> for ChiliQualityError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for ChiliQualityError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}
