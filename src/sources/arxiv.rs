//! arXiv candidate provider: the daily RSS announcement feed lists the new
//! ids, the export API supplies the paper details.

use reqwest::blocking::Client;

use super::atom::{
	decode_entities, extract_attribute, extract_entries, extract_nested, extract_tag_text, link_tags,
	normalize_whitespace,
};
use super::{http_client, send, SourceError, SourceResult};
use crate::config::{ARXIV_API_URL, ARXIV_ID_BATCH, ARXIV_RSS_URL, DEBUG_PAPER_COUNT, DEBUG_QUERY};
use crate::core::{strip_version, CandidatePaper};
use crate::ui;

const FEED_ERROR: &str = "Feed error for query";
const OAI_PREFIX: &str = "oai:arXiv.org:";

pub struct ArxivClient {
	client: Client,
	rss_url: String,
	api_url: String,
}

impl ArxivClient {
	pub fn new() -> SourceResult<Self> {
		Ok(Self {
			client: http_client()?,
			rss_url: ARXIV_RSS_URL.to_string(),
			api_url: ARXIV_API_URL.to_string(),
		})
	}

	/// Today's new submissions for `query` (e.g. `cs.AI+cs.LG`).
	pub fn fetch_new(&self, query: &str) -> SourceResult<Vec<CandidatePaper>> {
		let url = format!("{}/{}", self.rss_url, query);
		ui::debug(&format!("GET {}", url));
		let feed = send(self.client.get(&url))?.text()?;

		let ids = parse_announced_ids(&feed, query)?;
		ui::debug(&format!("Feed announces {} new papers", ids.len()));

		let mut papers = Vec::with_capacity(ids.len());
		let batches = ids.len().div_ceil(ARXIV_ID_BATCH);
		for (index, batch) in ids.chunks(ARXIV_ID_BATCH).enumerate() {
			let fetched = self.fetch_by_ids(batch)?;
			ui::debug(&format!(
				"Retrieved batch {}/{} ({} papers)",
				index + 1,
				batches,
				fetched.len()
			));
			papers.extend(fetched);
		}

		Ok(papers)
	}

	/// The most recently submitted `cs.AI` papers, regardless of date.
	pub fn fetch_latest(&self) -> SourceResult<Vec<CandidatePaper>> {
		ui::debug(&format!(
			"Retrieving {} {} papers regardless of the date",
			DEBUG_PAPER_COUNT, DEBUG_QUERY
		));
		let url = format!(
			"{}?search_query={}&sortBy=submittedDate&sortOrder=descending&max_results={}",
			self.api_url,
			urlencoding::encode(DEBUG_QUERY),
			DEBUG_PAPER_COUNT
		);
		let xml = send(self.client.get(&url))?.text()?;
		let mut papers = parse_api_response(&xml);
		papers.truncate(DEBUG_PAPER_COUNT);
		Ok(papers)
	}

	pub fn fetch_by_ids(&self, ids: &[String]) -> SourceResult<Vec<CandidatePaper>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		let url = format!(
			"{}?id_list={}&max_results={}",
			self.api_url,
			urlencoding::encode(&ids.join(",")),
			ids.len()
		);
		let xml = send(self.client.get(&url))?.text()?;
		Ok(parse_api_response(&xml))
	}
}

/// Ids of the entries announced as `new` (cross-lists and replacements are
/// dropped), with the OAI prefix removed.
pub fn parse_announced_ids(feed: &str, query: &str) -> SourceResult<Vec<String>> {
	let title = extract_tag_text(feed, "title")
		.ok_or_else(|| SourceError::Malformed("arXiv feed has no title".to_string()))?;
	if title.contains(FEED_ERROR) {
		return Err(SourceError::InvalidQuery(query.to_string()));
	}

	Ok(extract_entries(feed)
		.into_iter()
		.filter(|entry| extract_tag_text(entry, "arxiv:announce_type").as_deref() == Some("new"))
		.filter_map(|entry| extract_tag_text(entry, "id"))
		.map(|id| id.strip_prefix(OAI_PREFIX).unwrap_or(&id).to_string())
		.collect())
}

/// Papers of an export API response; error entries and entries without a
/// title are skipped.
pub fn parse_api_response(xml: &str) -> Vec<CandidatePaper> {
	extract_entries(xml).into_iter().filter_map(parse_api_entry).collect()
}

fn parse_api_entry(entry: &str) -> Option<CandidatePaper> {
	let id_url = extract_tag_text(entry, "id")?;
	if id_url.contains("/api/errors") {
		ui::warn(&format!(
			"arXiv API error: {}",
			extract_tag_text(entry, "summary").unwrap_or_default()
		));
		return None;
	}
	let id = strip_version(id_from_url(&id_url));
	let title = normalize_whitespace(&extract_tag_text(entry, "title")?);
	let summary = normalize_whitespace(&extract_tag_text(entry, "summary").unwrap_or_default());
	let authors = extract_nested(entry, "author", "name")
		.iter()
		.map(|name| normalize_whitespace(name))
		.collect();

	let pdf_url = link_tags(entry)
		.into_iter()
		.find(|link| {
			extract_attribute(link, "title").as_deref() == Some("pdf")
				|| extract_attribute(link, "type").as_deref() == Some("application/pdf")
		})
		.and_then(|link| extract_attribute(link, "href"))
		.unwrap_or_else(|| format!("https://arxiv.org/pdf/{}", id));

	Some(CandidatePaper::new(id, title, summary, authors, decode_entities(&pdf_url)))
}

/// `http://arxiv.org/abs/2401.01234v2` → `2401.01234v2`
fn id_from_url(url: &str) -> &str {
	url.rfind("/abs/").map(|pos| &url[pos + 5..]).unwrap_or(url)
}
