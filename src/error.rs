use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvertError {
    /// Input could not be interpreted as an image (bad base64, unknown bytes, empty raster).
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    /// The clipboard, drop set or selection held nothing that looks like an image.
    #[error("No image found: {0}")]
    NoImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl InvertError {
    pub fn is_decode(&self) -> bool {
        matches!(self, InvertError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, InvertError>;

// Serialized as the display string so reports can carry the failure text
impl serde::Serialize for InvertError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
