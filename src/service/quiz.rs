use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::Config;
use crate::error::InferenceError;
use crate::inference_server::InferenceServerHandle;
use crate::service::pages::{render, QuizPage, ResultPage};
use crate::session_server::SessionServerHandle;
use crate::structs::quiz::{Feedback, QuestionAnswer, QuizResult};
use crate::structs::quiz_type::{ANSWER_FIELD_PREFIX, SESSION_FIELD};

// 获取会话的题目，不包含参考答案
pub(crate) async fn get_session(
    path: web::Path<String>,
    sessions: web::Data<SessionServerHandle>,
) -> HttpResponse {
    match sessions.get(path.into_inner()).await {
        Some(questions) => {
            let questions: Vec<&str> = questions.iter().map(|qa| qa.question.as_str()).collect();
            HttpResponse::Ok().json(json!({
                "code": 200,
                "data": { "questions": questions }
            }))
        }
        None => HttpResponse::NotFound().json(json!({"code": 404})),
    }
}

// 提交答案并进行打分
pub(crate) async fn submit(
    form: web::Form<HashMap<String, String>>,
    config: web::Data<Config>,
    inference: web::Data<InferenceServerHandle>,
    sessions: web::Data<SessionServerHandle>,
) -> HttpResponse {
    let answers = form.into_inner();
    let Some(token) = answers.get(SESSION_FIELD) else {
        return render(
            StatusCode::BAD_REQUEST,
            &QuizPage::with_error("No quiz was submitted. Please upload a PDF first."),
        );
    };
    let Some(questions) = sessions.get(token.as_str()).await else {
        return render(
            StatusCode::NOT_FOUND,
            &QuizPage::with_error("This quiz has expired or does not exist. Please upload the PDF again."),
        );
    };

    match mark(&answers, &questions, &inference, config.quiz.threshold).await {
        Ok(result) => {
            log::info!("会话{token}得分 {}/{}", result.score, result.total);
            // 每场测验只能提交一次
            sessions.remove(token.as_str());
            render(
                StatusCode::OK,
                &ResultPage {
                    result,
                    threshold: config.quiz.threshold,
                },
            )
        }
        Err(e) => {
            log::error!("评分时出现错误: {e}");
            render(StatusCode::INTERNAL_SERVER_ERROR, &QuizPage::with_error(e.to_string()))
        }
    }
}

/// 逐题比较用户答案和参考答案，相似度严格大于阈值记为答对
///
/// 缺失的答案按空字符串处理
pub(crate) async fn mark(
    answers: &HashMap<String, String>,
    questions: &[QuestionAnswer],
    inference: &InferenceServerHandle,
    threshold: f32,
) -> Result<QuizResult, InferenceError> {
    let mut score = 0;
    let mut feedback = Vec::with_capacity(questions.len());
    for (i, qa) in questions.iter().enumerate() {
        let user_answer = answers
            .get(&format!("{ANSWER_FIELD_PREFIX}{i}"))
            .cloned()
            .unwrap_or_default();
        let similarity = inference
            .similarity(user_answer.clone(), qa.answer.clone())
            .await?;
        let correct = similarity > threshold;
        if correct {
            score += 1;
        }
        feedback.push(Feedback {
            question: qa.question.clone(),
            user_answer,
            correct_answer: qa.answer.clone(),
            similarity,
            correct,
        });
    }
    Ok(QuizResult {
        score,
        total: questions.len(),
        feedback,
    })
}
