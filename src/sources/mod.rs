//! # Sources
//!
//! Network clients for the two inputs of a digest run: the user's Zotero
//! library (reference corpus) and the day's new arXiv submissions
//! (candidates).

pub mod arxiv;
pub mod atom;
pub mod filter;
pub mod zotero;

use std::time::Duration;

use thiserror::Error;

use crate::config::{HTTP_TIMEOUT_SECS, USER_AGENT};

pub use arxiv::ArxivClient;
pub use filter::{parse_tags, CollectionFilter};
pub use zotero::ZoteroClient;

#[derive(Debug, Error)]
pub enum SourceError {
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("{url} returned HTTP {status}")]
	Status { url: String, status: u16 },

	#[error("invalid arXiv query: {0}")]
	InvalidQuery(String),

	#[error("unexpected response: {0}")]
	Malformed(String),

	#[error("invalid ignore pattern: {0}")]
	Pattern(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

pub(crate) fn http_client() -> SourceResult<reqwest::blocking::Client> {
	Ok(reqwest::blocking::Client::builder()
		.user_agent(USER_AGENT)
		.timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
		.build()?)
}

/// Send a prepared request and turn non-2xx answers into [`SourceError::Status`].
pub(crate) fn send(request: reqwest::blocking::RequestBuilder) -> SourceResult<reqwest::blocking::Response> {
	let response = request.send()?;
	let status = response.status();
	if !status.is_success() {
		return Err(SourceError::Status {
			url: response.url().to_string(),
			status: status.as_u16(),
		});
	}
	Ok(response)
}
