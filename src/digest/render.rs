//! HTML digest: one card per paper, grouped in sections when tags are used.

use std::fmt::Write;

use crate::config::AUTHOR_LIMIT;
use crate::core::{CandidatePaper, PartitionKey};
use crate::ranking::{PartitionStats, RankedPartition, RankingReport};

const CARD_STYLE: &str = "font-family: Arial, sans-serif; border: 1px solid #ddd; border-radius: 8px; padding: 16px; background-color: #f9f9f9;";
const PDF_STYLE: &str = "display: inline-block; text-decoration: none; font-size: 14px; font-weight: bold; color: #fff; background-color: #d9534f; padding: 8px 16px; border-radius: 4px;";

/// Render the full e-mail body for `report`.
pub fn render_digest(report: &RankingReport) -> String {
	let mut content = String::new();

	if !report.has_papers() && !report.global.use_sections {
		content.push_str(&empty_card("No Papers Today. Take a Rest!"));
	} else if report.global.use_sections {
		for partition in &report.partitions {
			content.push_str(&section(partition));
		}
		if report.partitions.is_empty() {
			content.push_str(&empty_card("No Papers Today. Take a Rest!"));
		}
	} else {
		for partition in &report.partitions {
			content.push_str(&cards(&partition.papers));
		}
	}

	let mut footer = format!(
		"Threshold: {:.2} &middot; Papers considered: {}",
		report.global.threshold, report.global.papers_considered
	);
	for skipped in &report.skipped {
		let _ = write!(
			footer,
			"<br>Skipped {}: {}",
			escape_html(&skipped.key.to_string()),
			escape_html(&skipped.reason)
		);
	}

	format!(
		r#"<!DOCTYPE HTML>
<html>
<head>
<meta charset="utf-8">
</head>
<body>

<div>
{content}
</div>

<br><br>
<div style="font-size: 12px; color: #888;">
{footer}
<br>
To unsubscribe, remove your email in your Github Action setting.
</div>

</body>
</html>
"#
	)
}

fn section(partition: &RankedPartition) -> String {
	let title = match &partition.key {
		PartitionKey::All => "All papers".to_string(),
		PartitionKey::Tag(tag) => tag.clone(),
	};

	let mut html = format!(
		r#"<h2 style="font-family: Arial, sans-serif; color: #333; border-bottom: 2px solid #d9534f; padding-bottom: 4px;">{}</h2>
<p style="font-family: Arial, sans-serif; font-size: 13px; color: #666;">{}</p>
"#,
		escape_html(&title),
		stats_line(&partition.stats)
	);

	if partition.papers.is_empty() {
		html.push_str(&empty_card("No papers above the threshold for this tag."));
	} else {
		html.push_str(&cards(&partition.papers));
	}
	html
}

fn stats_line(stats: &PartitionStats) -> String {
	match (stats.min_score, stats.max_score) {
		(Some(min), Some(max)) => format!(
			"{} reference papers &middot; scores {:.2} to {:.2}",
			stats.reference_count, min, max
		),
		_ => format!("{} reference papers &middot; nothing scored", stats.reference_count),
	}
}

fn cards(papers: &[CandidatePaper]) -> String {
	let blocks: Vec<String> = papers.iter().map(card).collect();
	format!("<br>{}</br>", blocks.join("</br><br>"))
}

fn card(paper: &CandidatePaper) -> String {
	let score = paper
		.score
		.map(|s| format!("{:.2}", s))
		.unwrap_or_else(|| "n/a".to_string());

	format!(
		r#"
<table border="0" cellpadding="0" cellspacing="0" width="100%" style="{CARD_STYLE}">
<tr>
    <td style="font-size: 20px; font-weight: bold; color: #333;">{title}</td>
</tr>
<tr>
    <td style="font-size: 14px; color: #666; padding: 8px 0;">{authors}</td>
</tr>
<tr>
    <td style="font-size: 14px; color: #333; padding: 8px 0;"><strong>Score:</strong> {score}</td>
</tr>
<tr>
    <td style="font-size: 14px; color: #333; padding: 8px 0;"><strong>arXiv ID:</strong> {id}</td>
</tr>
<tr>
    <td style="font-size: 14px; color: #333; padding: 8px 0;"><strong>Abstract:</strong> {summary}</td>
</tr>
<tr>
    <td style="padding: 8px 0;"><a href="{pdf_url}" style="{PDF_STYLE}">PDF</a></td>
</tr>
</table>
"#,
		title = escape_html(&paper.title),
		authors = escape_html(&paper.author_line(AUTHOR_LIMIT)),
		id = escape_html(&paper.id),
		summary = escape_html(&paper.summary),
		pdf_url = escape_html(&paper.pdf_url),
	)
}

fn empty_card(message: &str) -> String {
	format!(
		r#"
<table border="0" cellpadding="0" cellspacing="0" width="100%" style="{CARD_STYLE}">
<tr>
    <td style="font-size: 20px; font-weight: bold; color: #333;">{}</td>
</tr>
</table>
"#,
		escape_html(message)
	)
}

pub fn escape_html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ranking::{GlobalStats, SkippedPartition};

	fn paper(id: &str, title: &str, authors: usize, score: f64) -> CandidatePaper {
		CandidatePaper::new(
			id,
			title,
			"An abstract.",
			(1..=authors).map(|i| format!("Author {}", i)).collect(),
			format!("https://arxiv.org/pdf/{}", id),
		)
		.scored(score)
	}

	fn stats(min: f64, max: f64) -> PartitionStats {
		PartitionStats {
			reference_count: 3,
			scored: 2,
			min_score: Some(min),
			max_score: Some(max),
		}
	}

	fn report(partitions: Vec<RankedPartition>, use_sections: bool) -> RankingReport {
		RankingReport {
			partitions,
			skipped: Vec::new(),
			global: GlobalStats {
				threshold: -0.1,
				papers_considered: 2,
				use_sections,
			},
		}
	}

	#[test]
	fn renders_cards_with_scores_and_truncated_authors() {
		let html = render_digest(&report(
			vec![RankedPartition {
				key: PartitionKey::All,
				papers: vec![paper("2401.00001", "Graph Nets", 7, -0.000_34)],
				stats: stats(-0.12, -0.000_34),
			}],
			false,
		));

		assert!(html.contains("Graph Nets"));
		assert!(html.contains("<strong>Score:</strong> -0.00"));
		assert!(html.contains("Author 1, Author 2, Author 3, Author 4, Author 5, ..."));
		assert!(!html.contains("Author 6"));
		assert!(html.contains("https://arxiv.org/pdf/2401.00001"));
		assert!(html.contains("Papers considered: 2"));
		assert!(!html.contains("<h2"));
	}

	#[test]
	fn empty_day_card() {
		let html = render_digest(&report(
			vec![RankedPartition {
				key: PartitionKey::All,
				papers: Vec::new(),
				stats: stats(-0.5, -0.2),
			}],
			false,
		));
		assert!(html.contains("No Papers Today. Take a Rest!"));
	}

	#[test]
	fn sections_per_tag_with_stats() {
		let mut digest = report(
			vec![
				RankedPartition {
					key: PartitionKey::Tag("gnn".to_string()),
					papers: vec![paper("2401.00001", "Graph Nets", 2, 0.5)],
					stats: stats(-0.26, 0.5),
				},
				RankedPartition {
					key: PartitionKey::Tag("poetry".to_string()),
					papers: Vec::new(),
					stats: stats(-0.3, -0.2),
				},
			],
			true,
		);
		digest.skipped.push(SkippedPartition {
			key: PartitionKey::Tag("empty".to_string()),
			reason: "no reference papers".to_string(),
		});
		let html = render_digest(&digest);

		let gnn = html.find(">gnn</h2>").unwrap();
		let poetry = html.find(">poetry</h2>").unwrap();
		assert!(gnn < poetry);
		assert!(html.contains("scores -0.26 to 0.50"));
		assert!(html.contains("No papers above the threshold for this tag."));
		assert!(html.contains("Skipped tag &#39;empty&#39;: no reference papers"));
	}

	#[test]
	fn escapes_interpolated_text() {
		let html = render_digest(&report(
			vec![RankedPartition {
				key: PartitionKey::All,
				papers: vec![paper("2401.00002", "<script>alert(1)</script> & more", 1, 1.0)],
				stats: stats(1.0, 1.0),
			}],
			false,
		));
		assert!(!html.contains("<script>"));
		assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
	}
}
