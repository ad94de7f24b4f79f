//! Sentence-embedding model (BERT-style encoder exported to ONNX)

use anyhow::{bail, Context, Result};
use ort::session::Session;
use std::path::Path;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use crate::config::MAX_TOKENS;
use crate::core::Embedding;

pub struct TextModel {
	session: Session,
	tokenizer: Tokenizer,
}

impl TextModel {
	pub fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
		let session = crate::runtime::create_session(model_path).context("Failed to load embedding model")?;

		let mut tokenizer =
			Tokenizer::from_file(tokenizer_path).map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
		tokenizer
			.with_truncation(Some(TruncationParams {
				max_length: MAX_TOKENS,
				..Default::default()
			}))
			.map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
		tokenizer.with_padding(Some(PaddingParams::default()));

		Ok(Self { session, tokenizer })
	}

	/// Embed one padded batch: CLS token of the last hidden state, L2-normalized.
	pub fn encode_batch(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let encodings = self
			.tokenizer
			.encode_batch(texts.to_vec(), true)
			.map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

		let batch = encodings.len();
		let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

		let mut ids = Vec::with_capacity(batch * seq_len);
		let mut mask = Vec::with_capacity(batch * seq_len);
		let mut type_ids = Vec::with_capacity(batch * seq_len);
		for encoding in &encodings {
			ids.extend(encoding.get_ids().iter().map(|&x| x as i64));
			mask.extend(encoding.get_attention_mask().iter().map(|&x| x as i64));
			type_ids.extend(encoding.get_type_ids().iter().map(|&x| x as i64));
		}
		if ids.len() != batch * seq_len {
			bail!("Tokenizer produced ragged batch (padding disabled?)");
		}

		let shape = vec![batch, seq_len];
		let input_ids = ort::value::Value::from_array((shape.clone(), ids))?;
		let attention_mask = ort::value::Value::from_array((shape.clone(), mask))?;
		let token_type_ids = ort::value::Value::from_array((shape, type_ids))?;

		let outputs = self.session.run(ort::inputs![
			"input_ids" => input_ids,
			"attention_mask" => attention_mask,
			"token_type_ids" => token_type_ids
		])?;

		let hidden = outputs.get("last_hidden_state").context("No last_hidden_state output found")?;
		let (shape, data) = hidden.try_extract_tensor::<f32>()?;
		let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
		cls_rows(&dims, data, batch)
	}
}

/// First-token vector of each sequence in a `[batch, seq, dim]` tensor
fn cls_rows(dims: &[usize], data: &[f32], batch: usize) -> Result<Vec<Embedding>> {
	let &[b, seq, dim] = dims else {
		bail!("Unexpected output shape {:?} for batch of {}", dims, batch);
	};
	if b != batch || seq == 0 || dim == 0 {
		bail!("Unexpected output shape {:?} for batch of {}", dims, batch);
	}
	let stride = seq * dim;
	if data.len() < batch * stride {
		bail!("Output holds {} values, shape {:?} needs {}", data.len(), dims, batch * stride);
	}
	Ok((0..batch)
		.map(|i| Embedding::new(data[i * stride..i * stride + dim].to_vec()))
		.collect())
}
