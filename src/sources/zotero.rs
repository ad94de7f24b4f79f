//! Zotero Web API v3 client: fetches the user's library as reference items.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{http_client, send, SourceError, SourceResult};
use crate::config::{ZOTERO_API_URL, ZOTERO_ITEM_TYPES, ZOTERO_PAGE_SIZE};
use crate::core::ReferenceItem;
use crate::ui;

/// Collection nesting deeper than this is treated as a cycle.
const MAX_COLLECTION_DEPTH: usize = 64;

#[derive(Debug, Deserialize)]
struct Record<T> {
	key: String,
	data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionData {
	pub name: String,
	#[serde(rename = "parentCollection", default)]
	pub parent: Option<Parent>,
}

/// `parentCollection` is `false` for top-level collections, a key otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Parent {
	Key(String),
	Flag(bool),
}

impl CollectionData {
	fn parent_key(&self) -> Option<&str> {
		match &self.parent {
			Some(Parent::Key(key)) if !key.is_empty() => Some(key),
			_ => None,
		}
	}
}

#[derive(Debug, Deserialize)]
struct ItemData {
	#[serde(default)]
	title: String,
	#[serde(rename = "abstractNote", default)]
	abstract_note: String,
	#[serde(default)]
	tags: Vec<TagData>,
	#[serde(default)]
	collections: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagData {
	tag: String,
}

pub struct ZoteroClient {
	client: Client,
	base_url: String,
	user_id: String,
	api_key: String,
}

impl ZoteroClient {
	pub fn new(user_id: &str, api_key: &str) -> SourceResult<Self> {
		Ok(Self {
			client: http_client()?,
			base_url: ZOTERO_API_URL.to_string(),
			user_id: user_id.to_string(),
			api_key: api_key.to_string(),
		})
	}

	/// All papers of the library with a non-empty abstract, collection keys
	/// resolved into `Parent/Child` paths.
	pub fn fetch_corpus(&self) -> SourceResult<Vec<ReferenceItem>> {
		let collections: HashMap<String, CollectionData> = self
			.fetch_all::<CollectionData>("collections", &[])?
			.into_iter()
			.map(|record| (record.key, record.data))
			.collect();
		ui::debug(&format!("Fetched {} Zotero collections", collections.len()));

		let items = self.fetch_all::<ItemData>("items", &[("itemType", ZOTERO_ITEM_TYPES)])?;
		let total = items.len();

		let corpus: Vec<ReferenceItem> = items
			.into_iter()
			.filter(|record| !record.data.abstract_note.trim().is_empty())
			.map(|record| {
				let collection_paths = record
					.data
					.collections
					.iter()
					.filter_map(|key| collection_path(&collections, key))
					.collect();
				ReferenceItem {
					key: record.key,
					title: record.data.title,
					abstract_note: record.data.abstract_note,
					tags: record.data.tags.into_iter().map(|t| t.tag).collect(),
					collection_paths,
				}
			})
			.collect();

		ui::debug(&format!(
			"Dropped {} Zotero items without an abstract",
			total - corpus.len()
		));
		Ok(corpus)
	}

	/// Walk a paginated endpoint until `Total-Results` records have been read.
	fn fetch_all<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> SourceResult<Vec<Record<T>>> {
		let url = format!("{}/users/{}/{}", self.base_url, self.user_id, endpoint);
		let limit = ZOTERO_PAGE_SIZE.to_string();
		let mut records = Vec::new();

		loop {
			let start = records.len().to_string();
			let request = self
				.client
				.get(&url)
				.header("Zotero-API-Version", "3")
				.header("Zotero-API-Key", &self.api_key)
				.query(query)
				.query(&[("format", "json"), ("limit", limit.as_str()), ("start", start.as_str())]);
			let response = send(request)?;

			let total = total_results(response.headers())?;
			let page: Vec<Record<T>> = response.json()?;
			ui::debug(&format!("GET {} [{}..{}] of {}", endpoint, start, records.len() + page.len(), total));

			let exhausted = page.is_empty();
			records.extend(page);
			if exhausted || records.len() >= total {
				break;
			}
		}

		Ok(records)
	}
}

fn total_results(headers: &reqwest::header::HeaderMap) -> SourceResult<usize> {
	headers
		.get("Total-Results")
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.trim().parse().ok())
		.ok_or_else(|| SourceError::Malformed("Zotero response without Total-Results header".to_string()))
}

/// `Root/Child/Leaf` path of a collection. Unknown keys and cyclic parent
/// chains yield `None`.
pub fn collection_path(collections: &HashMap<String, CollectionData>, key: &str) -> Option<String> {
	let mut names = Vec::new();
	let mut current = key;

	for _ in 0..MAX_COLLECTION_DEPTH {
		let Some(collection) = collections.get(current) else {
			ui::debug(&format!("Unknown Zotero collection {}", current));
			return None;
		};
		names.push(collection.name.as_str());
		match collection.parent_key() {
			Some(parent) => current = parent,
			None => {
				names.reverse();
				return Some(names.join("/"));
			}
		}
	}

	ui::warn(&format!("Zotero collection {} nests too deeply; ignoring it", key));
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	fn collections() -> HashMap<String, CollectionData> {
		let json = r#"[
			{"key": "ROOT", "data": {"name": "ML", "parentCollection": false}},
			{"key": "GNN", "data": {"name": "Graphs", "parentCollection": "ROOT"}},
			{"key": "DEEP", "data": {"name": "Message Passing", "parentCollection": "GNN"}},
			{"key": "LOOP", "data": {"name": "Loop", "parentCollection": "LOOP"}}
		]"#;
		let records: Vec<Record<CollectionData>> = serde_json::from_str(json).unwrap();
		records.into_iter().map(|r| (r.key, r.data)).collect()
	}

	#[test]
	fn resolves_nested_paths() {
		let map = collections();
		assert_eq!(collection_path(&map, "ROOT").as_deref(), Some("ML"));
		assert_eq!(collection_path(&map, "GNN").as_deref(), Some("ML/Graphs"));
		assert_eq!(collection_path(&map, "DEEP").as_deref(), Some("ML/Graphs/Message Passing"));
	}

	#[test]
	fn unknown_and_cyclic_collections_yield_none() {
		let map = collections();
		assert_eq!(collection_path(&map, "MISSING"), None);
		assert_eq!(collection_path(&map, "LOOP"), None);
	}

	#[test]
	fn parses_item_records() {
		let json = r#"[{"key": "ITEM1", "version": 12, "data": {
			"itemType": "journalArticle",
			"title": "Graph Networks",
			"abstractNote": "Message passing.",
			"tags": [{"tag": "gnn"}, {"tag": "to-read", "type": 1}],
			"collections": ["GNN"]
		}}]"#;
		let records: Vec<Record<ItemData>> = serde_json::from_str(json).unwrap();
		assert_eq!(records[0].key, "ITEM1");
		assert_eq!(records[0].data.tags.len(), 2);
		assert_eq!(records[0].data.tags[1].tag, "to-read");
		assert_eq!(records[0].data.collections, vec!["GNN"]);
	}

	#[test]
	fn missing_parent_is_top_level() {
		let data: CollectionData = serde_json::from_str(r#"{"name": "Loose"}"#).unwrap();
		assert!(data.parent_key().is_none());
	}
}
