use std::io;

use actix_web::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读写配置文件: {0}")]
    Io(#[from] io::Error),
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("无法序列化默认配置: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 上传阶段的校验错误，会原样展示给用户
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was selected for upload.")]
    MissingFile,
    #[error("\"{0}\" is not a PDF file. Please upload a .pdf document.")]
    DisallowedExtension(String),
    #[error("The uploaded file is larger than the {0} byte limit.")]
    TooLarge(usize),
    #[error("The upload could not be read: {0}")]
    Multipart(String),
    #[error("The upload could not be stored: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("The model failed: {0}")]
    Model(String),
    #[error("The model server is not running.")]
    Closed,
}

impl From<anyhow::Error> for InferenceError {
    fn from(e: anyhow::Error) -> Self {
        InferenceError::Model(format!("{e:#}"))
    }
}

#[derive(Debug, Error)]
#[error("The quiz session store is not running.")]
pub struct SessionClosedError;

/// 上传 → 提取 → 生成 整条流程中可能出现的错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("The uploaded file is not a readable PDF ({0}).")]
    UnsupportedFormat(String),
    #[error("No text could be extracted from the PDF. Scanned or image-only documents are not supported.")]
    EmptyDocument,
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Session(#[from] SessionClosedError),
    #[error("The stored upload could not be read: {0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Upload(UploadError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Upload(_) => StatusCode::BAD_REQUEST,
            PipelineError::UnsupportedFormat(_) | PipelineError::EmptyDocument => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::Inference(_) | PipelineError::Session(_) | PipelineError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
