//! Preview command - rank and show locally

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::pipeline;
use crate::cli::RankArgs;
use crate::config::AUTHOR_LIMIT;
use crate::digest::render_digest;
use crate::ranking::{RankedPartition, RankingReport};
use crate::ui;

pub fn run(rank: &RankArgs, export: Option<&str>, html: Option<&Path>, debug: bool) -> Result<()> {
	let report = pipeline::run(rank, debug)?;

	match export {
		Some("-") => write_json(&report, &mut std::io::stdout().lock())?,
		Some(path) => {
			write_report(&report, Path::new(path))?;
			ui::success(&format!("Report saved to {}", ui::path_link(Path::new(path), 60)));
			print_report(&report);
		}
		None => print_report(&report),
	}

	if let Some(path) = html {
		fs::write(path, render_digest(&report)).with_context(|| format!("Failed to write {}", path.display()))?;
		ui::success(&format!("Digest saved to {}", ui::path_link(path, 60)));
	}

	Ok(())
}

/// Report as pretty JSON plus a trailing newline
pub fn write_json<W: Write>(report: &RankingReport, out: &mut W) -> Result<()> {
	serde_json::to_writer_pretty(&mut *out, report)?;
	writeln!(out)?;
	out.flush()?;
	Ok(())
}

pub fn write_report(report: &RankingReport, path: &Path) -> Result<()> {
	let json = serde_json::to_string_pretty(report)?;
	fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_report(report: &RankingReport) {
	for partition in &report.partitions {
		print_partition(partition);
	}
	for skipped in &report.skipped {
		ui::warn(&format!("Skipped {}: {}", skipped.key, skipped.reason));
	}
	println!();
}

fn print_partition(partition: &RankedPartition) {
	ui::header(&format!("─── {} ───", partition.key));

	let stats = &partition.stats;
	if let (Some(min), Some(max)) = (stats.min_score, stats.max_score) {
		println!(
			"  {}",
			format!(
				"{} reference papers, {} scored, scores {:.3} to {:.3}",
				stats.reference_count, stats.scored, min, max
			)
			.dimmed()
		);
	}

	if partition.papers.is_empty() {
		println!("  {}", "Nothing above the threshold".dimmed());
		return;
	}

	for (i, paper) in partition.papers.iter().enumerate() {
		let rank = format!("#{}", i + 1).bright_blue().bold();
		let score = format!("{:.3}", paper.score.unwrap_or_default()).yellow();
		println!("  {} {} {}", rank, score, paper.title.bright_white());
		println!(
			"     {} {}",
			paper.id.dimmed(),
			paper.author_line(AUTHOR_LIMIT).dimmed()
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{CandidatePaper, PartitionKey};
	use crate::ranking::{GlobalStats, PartitionStats};

	fn sample_report() -> RankingReport {
		RankingReport {
			partitions: vec![RankedPartition {
				key: PartitionKey::Tag("gnn".to_string()),
				papers: vec![CandidatePaper::new(
					"2401.00001v3",
					"Graph Nets",
					"Abstract",
					vec!["Ada".to_string()],
					"https://arxiv.org/pdf/2401.00001v3",
				)
				.scored(0.25)],
				stats: PartitionStats {
					reference_count: 3,
					scored: 1,
					min_score: Some(0.25),
					max_score: Some(0.25),
				},
			}],
			skipped: Vec::new(),
			global: GlobalStats {
				threshold: -0.1,
				papers_considered: 1,
				use_sections: true,
			},
		}
	}

	#[test]
	fn exports_report_as_json() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("report.json");
		write_report(&sample_report(), &path).unwrap();

		let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
		let partition = &value["partitions"][0];
		assert_eq!(partition["key"]["kind"], "tag");
		assert_eq!(partition["key"]["tag"], "gnn");
		assert_eq!(partition["papers"][0]["id"], "2401.00001");
		assert_eq!(partition["papers"][0]["score"], 0.25);
		assert_eq!(value["global"]["use_sections"], true);
	}

	#[test]
	fn streamed_json_is_the_whole_output() {
		let mut out = Vec::new();
		write_json(&sample_report(), &mut out).unwrap();

		assert!(out.ends_with(b"}\n"));
		let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
		assert_eq!(value["partitions"][0]["papers"][0]["title"], "Graph Nets");
	}
}
