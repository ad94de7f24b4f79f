//! Minimal Atom scanning for the arXiv feeds. The feeds are flat and
//! machine-generated, so tag scanning is enough; no XML tree is built.

/// Every `<entry>...</entry>` block, in document order.
pub fn extract_entries(xml: &str) -> Vec<&str> {
	let mut entries = Vec::new();
	let mut search_from = 0;

	while let Some(pos) = xml[search_from..].find("<entry>") {
		let start = search_from + pos;
		let Some(end_pos) = xml[start..].find("</entry>") else {
			break;
		};
		let end = start + end_pos + "</entry>".len();
		entries.push(&xml[start..end]);
		search_from = end;
	}

	entries
}

/// Text of the first `<tag ...>text</tag>`, trimmed and entity-decoded.
pub fn extract_tag_text(xml: &str, tag: &str) -> Option<String> {
	let open = format!("<{}", tag);
	let close = format!("</{}>", tag);

	let mut search_from = 0;
	loop {
		let start = search_from + xml[search_from..].find(&open)?;
		let after = start + open.len();
		// `<id` must not match `<idx>`
		match xml[after..].chars().next() {
			Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('\r') => {}
			Some('/') => return Some(String::new()),
			_ => {
				search_from = after;
				continue;
			}
		}
		let content_start = after + xml[after..].find('>')? + 1;
		let content_end = content_start + xml[content_start..].find(&close)?;
		return Some(decode_entities(xml[content_start..content_end].trim()));
	}
}

/// Text of every `<tag>` inside every `<block>`, e.g. author names.
pub fn extract_nested(xml: &str, block: &str, tag: &str) -> Vec<String> {
	let open = format!("<{}>", block);
	let close = format!("</{}>", block);
	let mut values = Vec::new();
	let mut search_from = 0;

	while let Some(pos) = xml[search_from..].find(&open) {
		let start = search_from + pos;
		let Some(end_pos) = xml[start..].find(&close) else {
			break;
		};
		let end = start + end_pos + close.len();
		if let Some(value) = extract_tag_text(&xml[start..end], tag) {
			values.push(value);
		}
		search_from = end;
	}

	values
}

/// Attribute value inside a single tag string.
pub fn extract_attribute(tag: &str, attr: &str) -> Option<String> {
	let search = format!(" {}=\"", attr);
	let start = tag.find(&search)? + search.len();
	let end = tag[start..].find('"')? + start;
	Some(decode_entities(&tag[start..end]))
}

/// Every `<link .../>` tag of a block.
pub fn link_tags(xml: &str) -> Vec<&str> {
	let mut links = Vec::new();
	let mut search_from = 0;

	while let Some(pos) = xml[search_from..].find("<link") {
		let start = search_from + pos;
		let Some(end_pos) = xml[start..].find('>') else {
			break;
		};
		let end = start + end_pos + 1;
		links.push(&xml[start..end]);
		search_from = end;
	}

	links
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
	s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn decode_entities(s: &str) -> String {
	if !s.contains('&') {
		return s.to_string();
	}
	s.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&apos;", "'")
		.replace("&#39;", "'")
		.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
	use super::*;

	const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <id>http://rss.arxiv.org/atom/cs.LG</id>
  <title>cs.LG updates on arXiv.org</title>
  <entry>
    <id>oai:arXiv.org:2410.00001v1</id>
    <title>Graphs &amp; Messages</title>
    <link href="https://arxiv.org/abs/2410.00001" rel="alternate" type="text/html"/>
    <arxiv:announce_type>new</arxiv:announce_type>
  </entry>
  <entry>
    <id>oai:arXiv.org:2409.00002v3</id>
    <title>Old   news</title>
    <arxiv:announce_type>replace</arxiv:announce_type>
  </entry>
</feed>"#;

	#[test]
	fn splits_entries() {
		let entries = extract_entries(FEED);
		assert_eq!(entries.len(), 2);
		assert!(entries[1].contains("2409.00002v3"));
	}

	#[test]
	fn first_tag_wins_and_entities_decode() {
		assert_eq!(extract_tag_text(FEED, "title").as_deref(), Some("cs.LG updates on arXiv.org"));
		let entries = extract_entries(FEED);
		assert_eq!(extract_tag_text(entries[0], "title").as_deref(), Some("Graphs & Messages"));
		assert_eq!(extract_tag_text(entries[1], "arxiv:announce_type").as_deref(), Some("replace"));
	}

	#[test]
	fn tag_prefix_does_not_match_longer_names() {
		let xml = "<idx>no</idx><id>yes</id>";
		assert_eq!(extract_tag_text(xml, "id").as_deref(), Some("yes"));
	}

	#[test]
	fn reads_attributes_and_nested_names() {
		let links = link_tags(FEED);
		assert_eq!(links.len(), 1);
		assert_eq!(extract_attribute(links[0], "href").as_deref(), Some("https://arxiv.org/abs/2410.00001"));
		assert_eq!(extract_attribute(links[0], "type").as_deref(), Some("text/html"));

		let xml = "<author><name>Ada</name></author><author><name>Alan</name></author>";
		assert_eq!(extract_nested(xml, "author", "name"), vec!["Ada", "Alan"]);
	}

	#[test]
	fn whitespace_collapses() {
		assert_eq!(normalize_whitespace("  a\n  b\tc "), "a b c");
	}
}
