//! Fetch the library and today's papers, then rank them

use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;

use crate::cli::RankArgs;
use crate::core::{CandidatePaper, ReferenceItem};
use crate::models::Models;
use crate::ranking::{OneClassSvm, Ranker, RankingReport};
use crate::sources::{parse_tags, ArxivClient, CollectionFilter, ZoteroClient};
use crate::ui;

pub fn fetch_corpus(args: &RankArgs) -> Result<Vec<ReferenceItem>> {
	ui::info("Retrieving Zotero corpus...");
	let zotero = ZoteroClient::new(&args.zotero_id, &args.zotero_key)?;
	let corpus = zotero.fetch_corpus().context("Failed to retrieve Zotero corpus")?;
	ui::success(&format!("Retrieved {} papers from Zotero", corpus.len()));

	match args.zotero_ignore.as_deref().map(str::trim) {
		Some(patterns) if !patterns.is_empty() => {
			ui::info(&format!("Ignoring papers in:\n{}", patterns.dimmed()));
			let filter = CollectionFilter::new(patterns)?;
			let corpus = filter.apply(corpus);
			ui::info(&format!("Remaining {} papers after filtering", corpus.len()));
			Ok(corpus)
		}
		_ => Ok(corpus),
	}
}

pub fn fetch_candidates(args: &RankArgs, debug: bool) -> Result<Vec<CandidatePaper>> {
	ui::info("Retrieving arXiv papers...");
	let arxiv = ArxivClient::new()?;
	let papers = if debug {
		arxiv.fetch_latest()
	} else {
		arxiv.fetch_new(&args.arxiv_query)
	}
	.context("Failed to retrieve arXiv papers")?;

	if papers.is_empty() {
		ui::warn("No new arXiv papers today");
	} else {
		ui::success(&format!("Retrieved {} arXiv papers", papers.len()));
	}
	Ok(papers)
}

/// `None` ranks against the whole library
pub fn requested_tags(args: &RankArgs) -> Option<Vec<String>> {
	let raw = args.zotero_tags.as_deref()?;
	let tags = parse_tags(raw);
	if tags.is_empty() {
		ui::warn("--zotero-tags holds no tag names; ranking against the full corpus");
		None
	} else {
		Some(tags)
	}
}

pub fn run(args: &RankArgs, debug: bool) -> Result<RankingReport> {
	let corpus = fetch_corpus(args)?;
	let candidates = fetch_candidates(args, debug)?;
	let tags = requested_tags(args);

	match &tags {
		Some(tags) => ui::info(&format!("Ranking papers for tags: {}", tags.join(", "))),
		None => ui::info("Ranking papers against full corpus..."),
	}

	let detector = OneClassSvm::new(args.nu, args.gamma)?;
	ui::debug(&format!(
		"One-class SVM: nu={}, gamma={}, threshold={}",
		detector.nu(),
		detector.gamma(),
		args.min_score
	));
	let mut ranker = Ranker::new(Models::new(&args.model), detector, args.min_score);

	let start = Instant::now();
	let report = ranker.rank(&candidates, &corpus, tags.as_deref())?;
	ui::debug(&format!("Ranking took {:.2}s", start.elapsed().as_secs_f32()));

	Ok(report)
}
