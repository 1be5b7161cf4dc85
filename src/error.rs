/// Errors raised by the segmentation predictor.
#[derive(thiserror::Error, Debug)]
pub enum SegmError {
    /// The entrypoint received something that is not one usable image or a
    /// homogeneous collection of usable images.
    #[error("Invalid input kind: {kind}")]
    InvalidInputKind { kind: String },

    /// A tensor produced by a collaborator does not have the shape the
    /// configuration expects.
    #[error("Shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        found: String,
    },

    #[error("Config Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Inference Error: {0}")]
    Inference(String),
}

impl SegmError {
    pub(crate) fn shape_mismatch(
        what: &'static str,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            what,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SegmError>;
