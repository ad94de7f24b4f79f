//! # Relevance Ranking
//!
//! Scores new papers against the reference library. Each partition fits a
//! [`StandardScaler`] and a novelty boundary on its own reference
//! embeddings, then scores candidates by signed distance from that
//! boundary.
//!
//! Both fit steps are pure: a reference matrix goes in, a fitted value
//! comes out. Nothing is cached between runs.

pub mod rank;
pub mod scaler;
pub mod svm;

use ndarray::{ArrayView1, ArrayView2};
use thiserror::Error;

use crate::core::PartitionKey;
use crate::models::EmbeddingError;

pub use rank::{GlobalStats, PartitionStats, RankedPartition, Ranker, RankingReport, SkippedPartition};
pub use scaler::StandardScaler;
pub use svm::{Gamma, OneClassSvm, RbfBoundary};

#[derive(Debug, Error)]
pub enum RankError {
	/// The partition has no reference items to learn from
	#[error("no reference items for {0}")]
	EmptyReferenceSet(PartitionKey),

	#[error(transparent)]
	Embedding(#[from] EmbeddingError),

	#[error("dimension mismatch: expected {expected}, got {actual}")]
	DimensionMismatch { expected: usize, actual: usize },

	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	#[error("non-finite score for candidate #{index}")]
	NonFiniteScore { index: usize },

	#[error("no embedding for library item #{index}")]
	MissingEmbedding { index: usize },
}

pub type RankResult<T> = Result<T, RankError>;

/// A learned boundary that maps a sample to a signed score.
/// Higher means more typical of the reference data.
pub trait DecisionFunction {
	fn decision(&self, sample: ArrayView1<'_, f64>) -> f64;

	fn decision_all(&self, samples: ArrayView2<'_, f64>) -> Vec<f64> {
		samples.rows().into_iter().map(|row| self.decision(row)).collect()
	}
}

/// Fits a one-class boundary around reference samples.
pub trait NoveltyDetector {
	type Boundary: DecisionFunction;

	fn fit(&self, reference: ArrayView2<'_, f64>) -> RankResult<Self::Boundary>;
}
