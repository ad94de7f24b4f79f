//! Corpus filters: gitignore-style collection exclusion and tag list parsing.

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::{SourceError, SourceResult};
use crate::core::ReferenceItem;

/// Drops library items filed under ignored collections. Patterns use
/// gitignore syntax against collection paths such as `ML/Graphs`.
pub struct CollectionFilter {
	matcher: Gitignore,
}

impl CollectionFilter {
	/// One pattern per line; blank lines and `#` comments are ignored,
	/// `!pattern` re-includes.
	pub fn new(patterns: &str) -> SourceResult<Self> {
		let mut builder = GitignoreBuilder::new(".");
		for line in patterns.lines() {
			builder
				.add_line(None, line)
				.map_err(|e| SourceError::Pattern(e.to_string()))?;
		}
		let matcher = builder.build().map_err(|e| SourceError::Pattern(e.to_string()))?;
		Ok(Self { matcher })
	}

	/// Collections are folders, so `Archive/` also ignores `Archive/2019`.
	pub fn is_ignored(&self, collection_path: &str) -> bool {
		let path = collection_path.trim_start_matches('/');
		!path.is_empty() && self.matcher.matched_path_or_any_parents(path, true).is_ignore()
	}

	/// Items with any ignored collection path are removed; items outside
	/// every collection are kept.
	pub fn apply(&self, corpus: Vec<ReferenceItem>) -> Vec<ReferenceItem> {
		corpus
			.into_iter()
			.filter(|item| !item.collection_paths.iter().any(|path| self.is_ignored(path)))
			.collect()
	}
}

/// Comma-separated tag list: entries trimmed, blanks and duplicates dropped,
/// first-occurrence order kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
	let mut tags: Vec<String> = Vec::new();
	for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
		if !tags.iter().any(|t| t == tag) {
			tags.push(tag.to_string());
		}
	}
	tags
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item(key: &str, paths: &[&str]) -> ReferenceItem {
		ReferenceItem {
			key: key.to_string(),
			title: String::new(),
			abstract_note: "abstract".to_string(),
			tags: Vec::new(),
			collection_paths: paths.iter().map(|p| p.to_string()).collect(),
		}
	}

	#[test]
	fn ignores_matching_collections_and_children() {
		let filter = CollectionFilter::new("Archive/\n# old stuff\n\nTeaching").unwrap();
		assert!(filter.is_ignored("Archive"));
		assert!(filter.is_ignored("Archive/2019"));
		assert!(filter.is_ignored("Teaching"));
		assert!(filter.is_ignored("ML/Teaching"));
		assert!(!filter.is_ignored("ML/Graphs"));
	}

	#[test]
	fn negation_reincludes() {
		let filter = CollectionFilter::new("Archive/*\n!Archive/Keep").unwrap();
		assert!(filter.is_ignored("Archive/Drop"));
		assert!(!filter.is_ignored("Archive/Keep"));
	}

	#[test]
	fn any_ignored_path_removes_the_item() {
		let filter = CollectionFilter::new("Archive").unwrap();
		let corpus = vec![
			item("a", &["ML/Graphs"]),
			item("b", &["ML/Graphs", "Archive/2019"]),
			item("c", &[]),
		];
		let kept: Vec<_> = filter.apply(corpus).into_iter().map(|i| i.key).collect();
		assert_eq!(kept, vec!["a", "c"]);
	}

	#[test]
	fn parses_tag_lists() {
		assert_eq!(parse_tags(" gnn, poetry ,,gnn, "), vec!["gnn", "poetry"]);
		assert!(parse_tags(" , ").is_empty());
	}
}
