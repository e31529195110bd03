//! Error handling for twinsync.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod inference_error;
pub mod model_error;
pub mod record_error;

pub use config_error::ConfigError;
pub use inference_error::InferenceError;
pub use model_error::ModelError;
pub use record_error::RecordError;

/// Top-level error aggregating every subsystem error via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum TwinError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("record error: {0}")]
    Record(#[from] RecordError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type TwinResult<T> = Result<T, TwinError>;
