use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.toml";

lazy_static! {
    /// 进程级配置，读取失败时退回默认值
    pub static ref CONFIG: Config = match Config::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            log::error!("读取配置文件失败，使用默认配置: {e}");
            Config::default()
        }
    };
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub quiz: QuizConfig,
    pub models: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub resources_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// 上传文件的保存目录，启动时自动创建
    pub dir: PathBuf,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    /// 为false时提取完文本后删除上传的文件
    pub retain_uploads: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// 提取文本的字符上限
    pub max_chars: usize,
    pub num_questions: usize,
    /// 相似度严格大于该值视为答对
    pub threshold: f32,
    /// 参考答案占位符，目前没有真正的答案提取
    pub placeholder_answer: String,
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub generator: String,
    pub embedder: String,
    pub top_k: usize,
    pub max_length: usize,
    /// 固定采样种子，不设置则每次随机
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:5000".to_string(),
            resources_dir: PathBuf::from("resources"),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            dir: PathBuf::from("uploads"),
            allowed_extensions: vec!["pdf".to_string()],
            max_upload_bytes: 32 * 1024 * 1024,
            retain_uploads: true,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            max_chars: 2000,
            num_questions: 5,
            threshold: 0.8,
            placeholder_answer: "Example Answer".to_string(),
            session_ttl_secs: 60 * 60,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            generator: "t5-small".to_string(),
            embedder: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            top_k: 50,
            max_length: 512,
            seed: None,
        }
    }
}

impl Config {
    /// 读取配置文件，不存在则写入一份默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("配置文件不存在，创建默认配置: {}", path.display());
            let config = Config::default();
            fs::write(path, toml::to_string(&config)?)?;
            return Ok(config);
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
