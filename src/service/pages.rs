use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use askama::Template;
use serde::Deserialize;

use crate::session_server::SessionServerHandle;
use crate::structs::quiz::{QuestionAnswer, QuizResult};
use crate::structs::quiz_type::SessionToken;

/// 上传和答题页面
#[derive(Template, Default)]
#[template(path = "index.html")]
pub(crate) struct QuizPage {
    pub session: Option<SessionToken>,
    pub questions: Vec<QuestionAnswer>,
    pub error: Option<String>,
}

impl QuizPage {
    pub fn with_session(token: SessionToken, questions: Vec<QuestionAnswer>) -> Self {
        QuizPage {
            session: Some(token),
            questions,
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        QuizPage {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// 评分结果页面
#[derive(Template)]
#[template(path = "result.html")]
pub(crate) struct ResultPage {
    pub result: QuizResult,
    pub threshold: f32,
}

pub(crate) fn render<T: Template>(status: StatusCode, page: &T) -> HttpResponse {
    match page.render() {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("渲染页面时出现错误: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct IndexQuery {
    session: Option<SessionToken>,
}

// 首页，带session参数时重新显示该会话的题目
pub(crate) async fn index(
    query: web::Query<IndexQuery>,
    sessions: web::Data<SessionServerHandle>,
) -> HttpResponse {
    let Some(token) = query.into_inner().session else {
        return render(StatusCode::OK, &QuizPage::default());
    };
    match sessions.get(token.clone()).await {
        Some(questions) => render(StatusCode::OK, &QuizPage::with_session(token, questions)),
        None => render(
            StatusCode::NOT_FOUND,
            &QuizPage::with_error("This quiz has expired or does not exist. Please upload the PDF again."),
        ),
    }
}
