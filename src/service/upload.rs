use std::io;
use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::{Config, UploadConfig};
use crate::error::{PipelineError, UploadError};
use crate::extractor::{self, Extraction};
use crate::inference_server::InferenceServerHandle;
use crate::service::pages::{render, QuizPage};
use crate::session_server::SessionServerHandle;
use crate::structs::quiz::QuestionAnswer;
use crate::structs::quiz_type::SessionToken;
use crate::utils::{allowed_file, sanitize_filename, stored_name};

// 上传pdf并生成题目
pub(crate) async fn upload(
    payload: Multipart,
    config: web::Data<Config>,
    inference: web::Data<InferenceServerHandle>,
    sessions: web::Data<SessionServerHandle>,
) -> HttpResponse {
    match build_quiz(payload, &config, &inference, &sessions).await {
        Ok((token, questions)) => render(StatusCode::OK, &QuizPage::with_session(token, questions)),
        Err(e) => {
            match e.status() {
                status if status.is_server_error() => log::error!("生成测验失败: {e}"),
                _ => log::warn!("拒绝上传: {e}"),
            }
            render(e.status(), &QuizPage::with_error(e.to_string()))
        }
    }
}

async fn build_quiz(
    payload: Multipart,
    config: &Config,
    inference: &InferenceServerHandle,
    sessions: &SessionServerHandle,
) -> Result<(SessionToken, Vec<QuestionAnswer>), PipelineError> {
    let path = save_upload(payload, &config.upload).await?;
    log::info!("已保存上传文件: {}", path.display());

    let max_chars = config.quiz.max_chars;
    let pdf_path = path.clone();
    let extraction = web::block(move || extractor::extract_text(&pdf_path, max_chars))
        .await
        .map_err(|e| io::Error::other(e.to_string()));
    let extraction = finish_extraction(extraction, &path, &config.upload).await?;

    let text = match extraction {
        Extraction::Text(text) => text,
        Extraction::Empty => return Err(PipelineError::EmptyDocument),
        Extraction::UnsupportedFormat(reason) => return Err(PipelineError::UnsupportedFormat(reason)),
    };
    log::info!("提取了{}个字符，开始生成题目", text.chars().count());

    let questions: Vec<QuestionAnswer> = inference
        .generate(text, config.quiz.num_questions)
        .await?
        .into_iter()
        .map(|question| QuestionAnswer::new(question, config.quiz.placeholder_answer.as_str()))
        .collect();
    let token = sessions.create(questions.clone()).await?;
    Ok((token, questions))
}

// 无论提取是否成功都先按配置清理上传文件，再返回提取结果
async fn finish_extraction(
    extraction: io::Result<io::Result<Extraction>>,
    path: &Path,
    upload: &UploadConfig,
) -> Result<Extraction, PipelineError> {
    if !upload.retain_uploads {
        if let Err(e) = tokio::fs::remove_file(path).await {
            log::warn!("删除上传文件{}失败: {e}", path.display());
        }
    }
    Ok(extraction??)
}

/// 把表单中的file字段写入上传目录，返回保存路径
async fn save_upload(mut payload: Multipart, upload: &UploadConfig) -> Result<PathBuf, UploadError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(sanitize_filename)
            .unwrap_or_default();
        // 浏览器在未选择文件时也会提交一个空文件名的字段
        if filename.is_empty() {
            return Err(UploadError::MissingFile);
        }
        if !allowed_file(&filename, &upload.allowed_extensions) {
            return Err(UploadError::DisallowedExtension(filename));
        }

        let path = upload.dir.join(stored_name(&filename));
        let mut file = tokio::fs::File::create(&path).await?;
        let mut written = 0;
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            written += chunk.len();
            if written > upload.max_upload_bytes {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(UploadError::TooLarge(upload.max_upload_bytes));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        return Ok(path);
    }
    Err(UploadError::MissingFile)
}
