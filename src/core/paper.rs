//! Papers flowing through the pipeline: new arXiv candidates and the
//! reference items of the user's library.

use serde::{Deserialize, Serialize};

/// A new arXiv paper awaiting a relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePaper {
	/// arXiv id without the version suffix (`2401.01234`, not `2401.01234v2`)
	pub id: String,
	pub title: String,
	pub summary: String,
	pub authors: Vec<String>,
	pub pdf_url: String,
	/// Set once by the ranker; `None` before scoring
	#[serde(skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
}

impl CandidatePaper {
	pub fn new(
		id: &str,
		title: impl Into<String>,
		summary: impl Into<String>,
		authors: Vec<String>,
		pdf_url: impl Into<String>,
	) -> Self {
		Self {
			id: strip_version(id).to_string(),
			title: title.into(),
			summary: summary.into(),
			authors,
			pdf_url: pdf_url.into(),
			score: None,
		}
	}

	/// Copy of this paper carrying `score`.
	pub fn scored(&self, score: f64) -> Self {
		Self {
			score: Some(score),
			..self.clone()
		}
	}

	/// Author list for display, cut after `limit` names.
	pub fn author_line(&self, limit: usize) -> String {
		let mut line = self
			.authors
			.iter()
			.take(limit)
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join(", ");
		if self.authors.len() > limit {
			line.push_str(", ...");
		}
		line
	}
}

/// An entry of the user's library; represents accepted taste.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceItem {
	pub key: String,
	pub title: String,
	pub abstract_note: String,
	pub tags: Vec<String>,
	/// Slash-joined collection paths, e.g. `ML/Graphs`
	pub collection_paths: Vec<String>,
}

impl ReferenceItem {
	pub fn has_tag(&self, tag: &str) -> bool {
		self.tags.iter().any(|t| t == tag)
	}
}

/// Strip a trailing `v<digits>` version marker from an arXiv id.
pub fn strip_version(id: &str) -> &str {
	match id.rfind('v') {
		Some(pos) => {
			let digits = &id[pos + 1..];
			if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
				&id[..pos]
			} else {
				id
			}
		}
		None => id,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_version_suffix() {
		assert_eq!(strip_version("2401.01234v2"), "2401.01234");
		assert_eq!(strip_version("2401.01234v12"), "2401.01234");
		assert_eq!(strip_version("2401.01234"), "2401.01234");
		assert_eq!(strip_version("hep-th/9901001v1"), "hep-th/9901001");
		assert_eq!(strip_version("solv-int/9901001"), "solv-int/9901001");
		assert_eq!(strip_version("2401.01234v"), "2401.01234v");
	}

	#[test]
	fn new_candidate_is_unscored_and_versionless() {
		let paper = CandidatePaper::new("2310.00001v3", "T", "S", vec![], "https://arxiv.org/pdf/2310.00001v3");
		assert_eq!(paper.id, "2310.00001");
		assert_eq!(paper.score, None);
		assert_eq!(paper.scored(0.5).score, Some(0.5));
	}

	#[test]
	fn author_line_truncates() {
		let authors = (1..=7).map(|i| format!("A{}", i)).collect();
		let paper = CandidatePaper::new("1", "T", "S", authors, "");
		assert_eq!(paper.author_line(5), "A1, A2, A3, A4, A5, ...");
		assert_eq!(paper.author_line(7), "A1, A2, A3, A4, A5, A6, A7");
	}
}
