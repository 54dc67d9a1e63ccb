use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No file field in upload")]
    MissingFile,
    #[error("Uploaded file is empty")]
    EmptyUpload,
    #[error("Upload exceeds the {0} byte limit")]
    UploadTooLarge(usize),
    #[error("Could not decode upload: {0}")]
    Decode(String),
    #[error("Image has invalid dimensions {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
    #[error("No decodable frames in video")]
    NoDecodableFrames,
    #[error("Model inference error: {0}")]
    Inference(String),
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Analysis was cancelled")]
    Blocking,
}

impl From<tch::TchError> for AnalysisError {
    fn from(err: tch::TchError) -> Self {
        AnalysisError::Inference(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for AnalysisError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AnalysisError::Multipart(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AnalysisError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        AnalysisError::Blocking
    }
}

impl ResponseError for AnalysisError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::MissingFile
            | AnalysisError::EmptyUpload
            | AnalysisError::Decode(_)
            | AnalysisError::InvalidImage { .. }
            | AnalysisError::Multipart(_) => StatusCode::BAD_REQUEST,
            AnalysisError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AnalysisError::NoDecodableFrames => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::Inference(_) | AnalysisError::Io(_) | AnalysisError::Blocking => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
