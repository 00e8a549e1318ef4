use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("model error: {0}")]
    Model(String),
}
