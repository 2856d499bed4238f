//! 预训练模型的封装
//!
//! [`QuestionGenerator`] 根据文本生成题目，[`Embedder`] 把文本编码为向量用于比较答案。
//! 两者都只在推理线程中使用，见 [`crate::inference_server`]。

use std::path::PathBuf;

use anyhow::Result;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};

pub mod minilm;
pub mod t5;

pub use minilm::MiniLmEmbedder;
pub use t5::T5Generator;

/// 生成结果为空时使用的兜底题目
pub const FALLBACK_QUESTION: &str = "What is the main idea of this text?";

pub trait QuestionGenerator: Send {
    /// 根据文本生成`count`道题目，每次调用结果可以不同
    fn generate(&mut self, text: &str, count: usize) -> Result<Vec<String>>;
}

pub trait Embedder: Send {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;

    fn similarity(&mut self, a: &str, b: &str) -> Result<f32> {
        let a = self.embed(a)?;
        let b = self.embed(b)?;
        Ok(cosine_similarity(&a, &b))
    }
}

/// 余弦相似度，任一向量为零向量时返回0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// 保证题目数量正好是`count`且都不为空
pub fn normalize_questions(questions: Vec<String>, count: usize) -> Vec<String> {
    let mut questions: Vec<String> = questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(count)
        .collect();
    questions.resize(count, FALLBACK_QUESTION.to_string());
    questions
}

/// 从模型仓库下载(或读取缓存的)模型文件
pub(crate) struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub(crate) fn fetch(model_id: &str) -> Result<ModelFiles> {
        let repo = Api::new()?.repo(Repo::new(model_id.to_string(), RepoType::Model));
        log::info!("正在获取模型文件: {model_id}");
        Ok(ModelFiles {
            config: repo.get("config.json")?,
            tokenizer: repo.get("tokenizer.json")?,
            weights: repo.get("model.safetensors")?,
        })
    }
}
