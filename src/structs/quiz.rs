use serde::{Deserialize, Serialize};

// 一道题目和它的参考答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

impl QuestionAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        QuestionAnswer {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// 单道题的评分详情
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub similarity: f32,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub feedback: Vec<Feedback>,
}
