use anyhow::{Error as E, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use tokenizers::Tokenizer;

use crate::config::ModelConfig;
use crate::model::{ModelFiles, QuestionGenerator, FALLBACK_QUESTION};

// 输入最多保留的token数
const MAX_INPUT_TOKENS: usize = 512;
// 单道题生成为空时的重试次数
const MAX_ATTEMPTS: usize = 3;

/// T5 seq2seq模型，使用top-k采样生成题目
pub struct T5Generator {
    model: T5ForConditionalGeneration,
    config: Config,
    tokenizer: Tokenizer,
    device: Device,
    top_k: usize,
    max_length: usize,
    seed: Option<u64>,
}

impl T5Generator {
    pub fn from_hub(models: &ModelConfig) -> Result<Self> {
        let files = ModelFiles::fetch(&models.generator)?;
        let device = Device::Cpu;
        let config: Config = serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;
        let tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(E::msg)?;
        let vb = VarBuilder::from_buffered_safetensors(std::fs::read(&files.weights)?, DType::F32, &device)?;
        let model = T5ForConditionalGeneration::load(vb, &config)?;
        log::info!("题目生成模型{}加载完成", models.generator);
        Ok(Self {
            model,
            config,
            tokenizer,
            device,
            top_k: models.top_k,
            max_length: models.max_length,
            seed: models.seed,
        })
    }

    fn sample_once(&mut self, encoder_output: &Tensor, seed: u64) -> Result<String> {
        let mut logits_processor = LogitsProcessor::from_sampling(
            seed,
            Sampling::TopK {
                k: self.top_k,
                temperature: 1.0,
            },
        );
        let start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut output_ids = vec![start];

        self.model.clear_kv_cache();
        for index in 0..self.max_length {
            let decoder_ids = if index == 0 || !self.config.use_cache {
                Tensor::new(output_ids.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last = output_ids[output_ids.len() - 1];
                Tensor::new(&[last], &self.device)?.unsqueeze(0)?
            };
            let logits = self
                .model
                .decode(&decoder_ids, encoder_output)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;
            let next = logits_processor.sample(&logits)?;
            if next as usize == self.config.eos_token_id {
                break;
            }
            output_ids.push(next);
        }

        let text = self.tokenizer.decode(&output_ids[1..], true).map_err(E::msg)?;
        Ok(text.trim().to_string())
    }
}

impl QuestionGenerator for T5Generator {
    fn generate(&mut self, text: &str, count: usize) -> Result<Vec<String>> {
        let encoding = self.tokenizer.encode(text, true).map_err(E::msg)?;
        let mut input_ids = encoding.get_ids().to_vec();
        if input_ids.len() > MAX_INPUT_TOKENS {
            // 截断时保留结尾的</s>
            input_ids.truncate(MAX_INPUT_TOKENS - 1);
            input_ids.push(self.config.eos_token_id as u32);
        }
        log::debug!("输入token数: {}", input_ids.len());

        let input = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let encoder_output = self.model.encode(&input)?;

        let mut questions = Vec::with_capacity(count);
        for i in 0..count {
            let mut question = String::new();
            for attempt in 0..MAX_ATTEMPTS {
                let seed = match self.seed {
                    Some(seed) => seed.wrapping_add((i * MAX_ATTEMPTS + attempt) as u64),
                    None => rand::random(),
                };
                question = self.sample_once(&encoder_output, seed)?;
                if !question.is_empty() {
                    break;
                }
            }
            if question.is_empty() {
                log::warn!("第{}道题多次生成为空，使用兜底题目", i + 1);
                question = FALLBACK_QUESTION.to_string();
            }
            log::debug!("第{}道题: {question}", i + 1);
            questions.push(question);
        }
        Ok(questions)
    }
}
