//! # Embedding Models
//!
//! Sentence-embedding inference behind the [`TextEncoder`] trait. The ONNX
//! implementation loads lazily and fetches missing model files from the
//! Hugging Face hub.

pub mod download;
pub mod manager;
pub mod text;

use thiserror::Error;

use crate::core::Embedding;

pub use manager::Models;

#[derive(Debug, Error)]
pub enum EmbeddingError {
	/// Model loading, tokenization or inference failed
	#[error("embedding model error: {0}")]
	Model(String),

	#[error("expected {expected} embeddings, got {actual}")]
	Count { expected: usize, actual: usize },

	#[error("malformed embedding: {0}")]
	Malformed(String),
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Maps texts to fixed-dimension vectors, one per input, in input order.
/// Must be deterministic for a fixed model.
pub trait TextEncoder {
	fn encode(&mut self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>>;
}

impl<T: TextEncoder + ?Sized> TextEncoder for &mut T {
	fn encode(&mut self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
		(**self).encode(texts)
	}
}
