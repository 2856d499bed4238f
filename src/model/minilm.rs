use anyhow::{Error as E, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use crate::model::{Embedder, ModelFiles};

// MiniLM训练时的最大序列长度
const MAX_SEQ_LEN: usize = 256;

/// sentence-transformers句向量模型，输出注意力掩码下的平均池化向量
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl MiniLmEmbedder {
    pub fn from_hub(model_id: &str) -> Result<Self> {
        let files = ModelFiles::fetch(model_id)?;
        let device = Device::Cpu;
        let config: Config = serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;
        let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(E::msg)?;
        tokenizer.with_padding(None::<PaddingParams>);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(E::msg)?;
        let vb = VarBuilder::from_buffered_safetensors(std::fs::read(&files.weights)?, DTYPE, &device)?;
        let model = BertModel::load(vb, &config)?;
        log::info!("句向量模型{model_id}加载完成");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

impl Embedder for MiniLmEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let encoding = self.tokenizer.encode(text, true).map_err(E::msg)?;
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        // (1, n_tokens, hidden)
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?.squeeze(0)?;
        Ok(pooled.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }
}
