//! Per-partition ranking of candidates against the reference corpus

use std::cmp::Ordering;
use std::time::Instant;

use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use super::{DecisionFunction, NoveltyDetector, RankError, RankResult, StandardScaler};
use crate::core::{CandidatePaper, Embedding, PartitionKey, ReferenceItem};
use crate::models::{EmbeddingError, TextEncoder};
use crate::ui;

/// Score range over every candidate of a partition, before thresholding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionStats {
	pub reference_count: usize,
	pub scored: usize,
	pub min_score: Option<f64>,
	pub max_score: Option<f64>,
}

impl PartitionStats {
	fn from_scores(reference_count: usize, scores: &[f64]) -> Self {
		let min_score = scores.iter().copied().reduce(f64::min);
		let max_score = scores.iter().copied().reduce(f64::max);
		Self {
			reference_count,
			scored: scores.len(),
			min_score,
			max_score,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedPartition {
	pub key: PartitionKey,
	/// Candidates with `score >= threshold`, best first
	pub papers: Vec<CandidatePaper>,
	pub stats: PartitionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedPartition {
	pub key: PartitionKey,
	pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
	pub threshold: f64,
	pub papers_considered: usize,
	pub use_sections: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
	/// In tag order; a single `PartitionKey::All` entry when unpartitioned
	pub partitions: Vec<RankedPartition>,
	pub skipped: Vec<SkippedPartition>,
	pub global: GlobalStats,
}

impl RankingReport {
	pub fn get(&self, key: &PartitionKey) -> Option<&RankedPartition> {
		self.partitions.iter().find(|p| &p.key == key)
	}

	/// Papers across all partitions (a paper in two sections counts twice)
	pub fn total_ranked(&self) -> usize {
		self.partitions.iter().map(|p| p.papers.len()).sum()
	}

	pub fn has_papers(&self) -> bool {
		self.total_ranked() > 0
	}
}

/// Drives encoder, scaler and detector over every partition.
pub struct Ranker<E, D> {
	encoder: E,
	detector: D,
	min_score: f64,
}

impl<E: TextEncoder, D: NoveltyDetector> Ranker<E, D> {
	pub fn new(encoder: E, detector: D, min_score: f64) -> Self {
		Self {
			encoder,
			detector,
			min_score,
		}
	}

	pub fn min_score(&self) -> f64 {
		self.min_score
	}

	/// Rank `candidates` once per partition of `corpus`.
	///
	/// `tags = None` ranks against the whole corpus under
	/// `PartitionKey::All`. Empty partitions and partitions whose fit fails
	/// are reported as skipped; embedding failures abort the whole run.
	pub fn rank(
		&mut self,
		candidates: &[CandidatePaper],
		corpus: &[ReferenceItem],
		tags: Option<&[String]>,
	) -> RankResult<RankingReport> {
		let partitions = partition_corpus(corpus, tags);
		let global = GlobalStats {
			threshold: self.min_score,
			papers_considered: candidates.len(),
			use_sections: tags.is_some(),
		};

		let mut needed: Vec<usize> = partitions.iter().flat_map(|(_, idx)| idx.iter().copied()).collect();
		needed.sort_unstable();
		needed.dedup();

		let (candidate_matrix, corpus_matrix) = if candidates.is_empty() || needed.is_empty() {
			(None, None)
		} else {
			let start = Instant::now();
			let texts: Vec<&str> = needed.iter().map(|&i| corpus[i].abstract_note.as_str()).collect();
			let corpus_matrix = embed_matrix(&mut self.encoder, &texts)?;
			let texts: Vec<&str> = candidates.iter().map(|c| c.summary.as_str()).collect();
			let candidate_matrix = embed_matrix(&mut self.encoder, &texts)?;
			if candidate_matrix.ncols() != corpus_matrix.ncols() {
				return Err(EmbeddingError::Malformed(format!(
					"candidate embeddings have {} dimensions, corpus embeddings {}",
					candidate_matrix.ncols(),
					corpus_matrix.ncols()
				))
				.into());
			}
			ui::debug(&format!(
				"Embedded {} reference and {} candidate texts in {:.2}s",
				needed.len(),
				texts.len(),
				start.elapsed().as_secs_f32()
			));
			(Some(candidate_matrix), Some(corpus_matrix))
		};

		let mut ranked = Vec::new();
		let mut skipped = Vec::new();

		for (key, indices) in partitions {
			if indices.is_empty() {
				ui::warn(&format!("No papers found in the reference corpus for {}. Skipping.", key));
				skipped.push(SkippedPartition {
					reason: RankError::EmptyReferenceSet(key.clone()).to_string(),
					key,
				});
				continue;
			}
			ui::info(&format!("Ranking against {} ({} reference papers)", key, indices.len()));

			let (Some(candidate_rows), Some(corpus_rows)) = (&candidate_matrix, &corpus_matrix) else {
				ranked.push(RankedPartition {
					key,
					papers: Vec::new(),
					stats: PartitionStats::from_scores(indices.len(), &[]),
				});
				continue;
			};

			let reference = select_rows(corpus_rows.view(), &needed, &indices)?;
			match self.rank_partition(&key, reference.view(), candidate_rows.view(), candidates) {
				Ok(partition) => {
					if partition.papers.is_empty() {
						ui::info(&format!("No papers above threshold {} for {}", self.min_score, key));
					} else {
						ui::success(&format!("{} papers above threshold for {}", partition.papers.len(), key));
					}
					ranked.push(partition);
				}
				Err(err) => {
					ui::error(&format!("Ranking failed for {}: {}", key, err));
					skipped.push(SkippedPartition {
						key,
						reason: err.to_string(),
					});
				}
			}
		}

		Ok(RankingReport {
			partitions: ranked,
			skipped,
			global,
		})
	}

	fn rank_partition(
		&self,
		key: &PartitionKey,
		reference: ArrayView2<'_, f64>,
		candidate_matrix: ArrayView2<'_, f64>,
		candidates: &[CandidatePaper],
	) -> RankResult<RankedPartition> {
		let scaler = StandardScaler::fit(reference)?;
		let scaled_reference = scaler.transform(reference)?;
		let scaled_candidates = scaler.transform(candidate_matrix)?;

		let boundary = self.detector.fit(scaled_reference.view())?;
		let scores = boundary.decision_all(scaled_candidates.view());
		if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
			return Err(RankError::NonFiniteScore { index });
		}

		let stats = PartitionStats::from_scores(reference.nrows(), &scores);
		if let (Some(min), Some(max)) = (stats.min_score, stats.max_score) {
			ui::debug(&format!("{}: min score {:.3}, max score {:.3}", key, min, max));
		}

		let mut kept: Vec<(usize, f64)> = scores
			.iter()
			.copied()
			.enumerate()
			.filter(|&(_, score)| score >= self.min_score)
			.collect();
		order_by_score(&mut kept);

		Ok(RankedPartition {
			key: key.clone(),
			papers: kept.into_iter().map(|(i, score)| candidates[i].scored(score)).collect(),
			stats,
		})
	}
}

/// Split the corpus into partitions of item indices.
///
/// Items with a blank abstract never take part. Without tags there is one
/// `PartitionKey::All` partition; repeated tags collapse to one partition.
pub fn partition_corpus(corpus: &[ReferenceItem], tags: Option<&[String]>) -> Vec<(PartitionKey, Vec<usize>)> {
	let eligible = || {
		corpus
			.iter()
			.enumerate()
			.filter(|(_, item)| !item.abstract_note.trim().is_empty())
	};

	match tags {
		None => vec![(PartitionKey::All, eligible().map(|(i, _)| i).collect())],
		Some(tags) => {
			let mut partitions: Vec<(PartitionKey, Vec<usize>)> = Vec::new();
			for tag in tags {
				let key = PartitionKey::Tag(tag.clone());
				if partitions.iter().any(|(k, _)| k == &key) {
					continue;
				}
				let indices = eligible().filter(|(_, item)| item.has_tag(tag)).map(|(i, _)| i).collect();
				partitions.push((key, indices));
			}
			partitions
		}
	}
}

/// Encode `texts` into a row-per-text matrix, rejecting malformed output.
fn embed_matrix<E: TextEncoder>(encoder: &mut E, texts: &[&str]) -> RankResult<Array2<f64>> {
	let embeddings = encoder.encode(texts)?;
	Ok(to_matrix(&embeddings, texts.len())?)
}

fn to_matrix(embeddings: &[Embedding], expected: usize) -> Result<Array2<f64>, EmbeddingError> {
	if embeddings.len() != expected {
		return Err(EmbeddingError::Count {
			expected,
			actual: embeddings.len(),
		});
	}
	let dim = embeddings.first().map(Embedding::dim).unwrap_or(0);
	if expected > 0 && dim == 0 {
		return Err(EmbeddingError::Malformed("empty embedding vector".into()));
	}

	let mut matrix = Array2::zeros((expected, dim));
	for (row, emb) in embeddings.iter().enumerate() {
		if emb.dim() != dim {
			return Err(EmbeddingError::Malformed(format!(
				"embedding #{} has {} dimensions, expected {}",
				row,
				emb.dim(),
				dim
			)));
		}
		if !emb.is_finite() {
			return Err(EmbeddingError::Malformed(format!("embedding #{} contains non-finite values", row)));
		}
		for (slot, &v) in matrix.row_mut(row).iter_mut().zip(emb.as_slice()) {
			*slot = v as f64;
		}
	}
	Ok(matrix)
}

/// Rows of `matrix` for corpus `indices`; `needed` maps matrix rows to corpus indices.
fn select_rows(matrix: ArrayView2<'_, f64>, needed: &[usize], indices: &[usize]) -> RankResult<Array2<f64>> {
	let mut out = Array2::zeros((indices.len(), matrix.ncols()));
	for (row, &idx) in indices.iter().enumerate() {
		let pos = needed
			.binary_search(&idx)
			.map_err(|_| RankError::MissingEmbedding { index: idx })?;
		out.row_mut(row).assign(&matrix.row(pos));
	}
	Ok(out)
}

/// Highest score first. Equal scores, `0.0` and `-0.0` included, keep input order.
fn order_by_score(kept: &mut [(usize, f64)]) {
	kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}
