//! Lazy model loading coordinator

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;

use super::{download, text::TextModel, EmbeddingError, EmbeddingResult, TextEncoder};
use crate::config;
use crate::core::Embedding;
use crate::ui;

pub struct Models {
	model_id: String,
	text: Option<TextModel>,
	model_path: PathBuf,
	tokenizer_path: PathBuf,
}

impl Models {
	pub fn new(model_id: &str) -> Self {
		Self {
			model_id: model_id.to_string(),
			text: None,
			model_path: config::model_path(model_id),
			tokenizer_path: config::tokenizer_path(model_id),
		}
	}

	fn text_model(&mut self) -> Result<&mut TextModel> {
		if self.text.is_none() {
			download::ensure_model(&self.model_id, &self.model_path, &self.tokenizer_path)?;

			ui::debug(&format!("Loading embedding model: {}", self.model_path.display()));
			let start = Instant::now();
			self.text = Some(TextModel::load(&self.model_path, &self.tokenizer_path)?);
			ui::success(&format!(
				"Embedding model {} loaded in {:.2}s",
				self.model_id,
				start.elapsed().as_secs_f32()
			));
		}

		self.text.as_mut().context("Embedding model not loaded")
	}

	fn encode_all(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
		let model = self.text_model()?;
		let total = texts.len().div_ceil(config::EMBED_BATCH_SIZE);
		let mut embeddings = Vec::with_capacity(texts.len());

		for (index, chunk) in texts.chunks(config::EMBED_BATCH_SIZE).enumerate() {
			ui::debug(&format!("Embedding batch {}/{} ({} texts)", index + 1, total, chunk.len()));
			embeddings.extend(model.encode_batch(chunk)?);
		}

		Ok(embeddings)
	}
}

impl TextEncoder for Models {
	fn encode(&mut self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
		self.encode_all(texts).map_err(|e| EmbeddingError::Model(format!("{:#}", e)))
	}
}
