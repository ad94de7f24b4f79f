//! Unified logging system

use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);
static TO_STDERR: AtomicBool = AtomicBool::new(false);

pub struct Log;

impl Log {
	pub fn set_verbose(enabled: bool) {
		VERBOSE.store(enabled, Ordering::Relaxed);
	}

	pub fn is_verbose() -> bool {
		VERBOSE.load(Ordering::Relaxed)
	}

	/// Keep stdout for data, e.g. JSON piped to another tool
	pub fn set_stderr(enabled: bool) {
		TO_STDERR.store(enabled, Ordering::Relaxed);
	}

	pub fn is_stderr() -> bool {
		TO_STDERR.load(Ordering::Relaxed)
	}
}

fn emit(line: std::fmt::Arguments<'_>) {
	if Log::is_stderr() {
		eprintln!("{}", line);
	} else {
		println!("{}", line);
	}
}

pub fn info(msg: &str) {
	emit(format_args!("{} {}", "ℹ".bright_blue().bold(), msg.bright_white()));
}

pub fn success(msg: &str) {
	emit(format_args!("{} {}", "✓".bright_green().bold(), msg.bright_white()));
}

pub fn warn(msg: &str) {
	emit(format_args!("{} {}", "⚠".bright_yellow().bold(), msg.bright_white()));
}

pub fn error(msg: &str) {
	eprintln!("{} {}", "✗".bright_red().bold(), msg.bright_white());
}

pub fn debug(msg: &str) {
	if Log::is_verbose() {
		emit(format_args!("{} {}", "⚙".bright_black().bold(), msg.dimmed()));
	}
}

pub fn header(text: &str) {
	emit(format_args!("\n{}", text.bright_blue().bold()));
}

pub fn banner() {
	emit(format_args!(
		"\n{}",
		format!("─── arxiv-digest v{} ───", env!("CARGO_PKG_VERSION"))
			.bright_blue()
			.bold()
	));
}

/// Clickable file path (OSC 8 terminal hyperlink)
pub fn path_link(path: &std::path::Path, max_len: usize) -> String {
	let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

	let uri = if cfg!(windows) {
		let path_str = absolute.to_string_lossy();
		let cleaned = path_str.strip_prefix(r"\\?\").unwrap_or(&path_str);
		format!("file:///{}", cleaned.replace('\\', "/"))
	} else {
		format!("file://{}", absolute.display())
	};

	let filename = path
		.file_name()
		.and_then(|n| n.to_str())
		.unwrap_or("unknown");

	format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", uri, shorten(filename, max_len))
}

/// Keep both ends of a long name: `long_mod...l.onnx`
fn shorten(name: &str, max_len: usize) -> String {
	let chars: Vec<char> = name.chars().collect();
	if chars.len() <= max_len || max_len < 8 {
		return name.to_string();
	}
	let head = max_len / 2;
	let tail = max_len - head - 3;
	let start: String = chars[..head].iter().collect();
	let end: String = chars[chars.len() - tail..].iter().collect();
	format!("{}...{}", start, end)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stderr_switch_round_trips() {
		Log::set_stderr(true);
		assert!(Log::is_stderr());
		Log::set_stderr(false);
		assert!(!Log::is_stderr());
	}

	#[test]
	fn short_names_pass_through() {
		assert_eq!(shorten("model.onnx", 60), "model.onnx");
	}

	#[test]
	fn long_names_keep_both_ends() {
		let short = shorten("abcdefghijklmnopqrstuvwxyz.onnx", 12);
		assert_eq!(short, "abcdef...nnx");
		assert_eq!(short.chars().count(), 12);
	}

	#[test]
	fn multibyte_names_do_not_split_chars() {
		let short = shorten("ééééééééééééééééé.json", 10);
		assert_eq!(short.chars().count(), 10);
	}
}
