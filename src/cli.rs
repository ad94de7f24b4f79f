use clap::builder::{BoolishValueParser, Styles};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{DEFAULT_MIN_SCORE, DEFAULT_MODEL, DEFAULT_NU};
use crate::ranking::Gamma;

/// Execution provider for ONNX Runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Provider {
	/// Auto-detect best available (CUDA → CoreML → XNNPACK → CPU)
	#[default]
	Auto,
	/// CPU only
	Cpu,
	/// NVIDIA CUDA GPU
	Cuda,
	/// Apple CoreML (macOS only)
	Coreml,
	/// XNNPACK (optimized CPU kernels)
	Xnnpack,
}

fn parse_nu(s: &str) -> Result<f64, String> {
	let val: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
	if val > 0.0 && val <= 1.0 {
		Ok(val)
	} else {
		Err(format!("nu must be in (0, 1], got {}", val))
	}
}

fn parse_score(s: &str) -> Result<f64, String> {
	let val: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
	if val.is_finite() {
		Ok(val)
	} else {
		Err(format!("score threshold must be finite, got {}", val))
	}
}

fn styles() -> Styles {
	Styles::styled()
		.header(anstyle::Style::new().bold().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.usage(anstyle::Style::new().bold().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))))
		.valid(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.invalid(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))))
}

#[derive(Parser, Debug)]
#[command(
	name = "arxiv-digest",
	author,
	version,
	about = "Daily arXiv digest ranked against your Zotero library",
	styles = styles(),
	disable_help_subcommand = true,
	after_help = format!(
		"{title}
  {bin} {digest}   {digest_args}      {digest_desc}
  {bin} {preview}  {preview_args}   {preview_desc}
  {bin} {preview}  {tags_args}   {tags_desc}
  {bin} {help}     {help_args}                  {help_desc}

Every option can also be set through its environment variable or a .env file.",
		title = "Examples:".bright_blue().bold(),
		bin = "arxiv-digest".bright_blue(),
		digest = "digest".yellow(),
		digest_args = "--arxiv-query cs.AI+cs.LG",
		digest_desc = "Rank today's papers and mail them".dimmed(),
		preview = "preview".yellow(),
		preview_args = "--arxiv-query cs.CL --html out.html",
		preview_desc = "Rank and write the digest locally".dimmed(),
		tags_args = "--zotero-tags gnn,nlp --export -",
		tags_desc = "One section per tag, JSON to stdout".dimmed(),
		help = "help".yellow(),
		help_args = "digest",
		help_desc = "Show help for digest".dimmed(),
	),
)]
pub struct Cli {
	/// Verbose output; fetch the 5 latest cs.AI papers instead of today's feed
	#[arg(short = 'v', long = "debug", alias = "verbose", global = true)]
	pub debug: bool,

	/// Execution provider: auto, cpu, cuda, coreml, xnnpack
	#[arg(short = 'p', long = "provider", global = true, default_value = "auto")]
	pub provider: Provider,

	/// Directory holding the embedding models
	#[arg(long = "model-dir", global = true, value_name = "PATH")]
	pub model_dir: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Rank today's arXiv papers against the Zotero library and e-mail the digest
	Digest {
		#[command(flatten)]
		rank: RankArgs,

		#[command(flatten)]
		mail: MailArgs,

		/// Send the digest even when no paper passes the threshold
		#[arg(long = "send-empty", env = "SEND_EMPTY", value_parser = BoolishValueParser::new())]
		send_empty: bool,
	},

	/// Rank today's papers and show the result locally instead of mailing it
	Preview {
		#[command(flatten)]
		rank: RankArgs,

		/// Write the ranking report as JSON (`-` for stdout)
		#[arg(long = "export", value_name = "PATH|-")]
		export: Option<String>,

		/// Write the rendered digest HTML
		#[arg(long = "html", value_name = "PATH")]
		html: Option<PathBuf>,
	},

	/// Show help for a subcommand
	Help {
		/// Subcommand name
		subcommand: Option<String>,
	},
}

/// Inputs shared by every command that fetches and ranks papers
#[derive(Args, Debug, Clone)]
pub struct RankArgs {
	/// Zotero user ID
	#[arg(long = "zotero-id", env = "ZOTERO_ID")]
	pub zotero_id: String,

	/// Zotero API key
	#[arg(long = "zotero-key", env = "ZOTERO_KEY", hide_env_values = true)]
	pub zotero_key: String,

	/// Zotero collections to ignore, gitignore-style patterns (one per line)
	#[arg(long = "zotero-ignore", env = "ZOTERO_IGNORE")]
	pub zotero_ignore: Option<String>,

	/// Comma-separated Zotero tags; each tag gets its own section
	#[arg(long = "zotero-tags", env = "ZOTERO_TAGS")]
	pub zotero_tags: Option<String>,

	/// arXiv RSS query, e.g. "cs.AI+cs.CV+stat.ML"
	#[arg(long = "arxiv-query", env = "ARXIV_QUERY")]
	pub arxiv_query: String,

	/// Minimum score for a paper to be recommended
	#[arg(long = "min-score", env = "MIN_SCORE", default_value_t = DEFAULT_MIN_SCORE, value_parser = parse_score, allow_hyphen_values = true)]
	pub min_score: f64,

	/// Upper bound on the fraction of library papers outside the boundary
	#[arg(long = "nu", env = "NU", default_value_t = DEFAULT_NU, value_parser = parse_nu)]
	pub nu: f64,

	/// RBF kernel width: "scale", "auto" or a positive number
	#[arg(long = "gamma", env = "GAMMA", default_value = "scale")]
	pub gamma: Gamma,

	/// Sentence-embedding model (Hugging Face id)
	#[arg(long = "model", env = "EMBEDDING_MODEL", default_value = DEFAULT_MODEL)]
	pub model: String,
}

#[derive(Args, Debug, Clone)]
pub struct MailArgs {
	/// SMTP server
	#[arg(long = "smtp-server", env = "SMTP_SERVER")]
	pub smtp_server: String,

	/// SMTP port
	#[arg(long = "smtp-port", env = "SMTP_PORT")]
	pub smtp_port: u16,

	/// Sender e-mail address (also the SMTP login)
	#[arg(long = "sender", env = "SENDER")]
	pub sender: String,

	/// Receiver e-mail address
	#[arg(long = "receiver", env = "RECEIVER")]
	pub receiver: String,

	/// Sender e-mail password
	#[arg(long = "sender-password", env = "SENDER_PASSWORD", hide_env_values = true)]
	pub sender_password: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn command_is_well_formed() {
		Cli::command().debug_assert();
	}

	#[test]
	fn parses_preview_with_negative_threshold() {
		let cli = Cli::try_parse_from([
			"arxiv-digest",
			"--debug",
			"preview",
			"--zotero-id",
			"123",
			"--zotero-key",
			"key",
			"--arxiv-query",
			"cs.AI",
			"--min-score",
			"-0.5",
			"--gamma",
			"auto",
			"--export",
			"-",
		])
		.unwrap();

		assert!(cli.debug);
		match cli.command {
			Command::Preview { rank, export, html } => {
				assert_eq!(rank.min_score, -0.5);
				assert_eq!(rank.gamma, Gamma::Auto);
				assert_eq!(rank.nu, DEFAULT_NU);
				assert_eq!(export.as_deref(), Some("-"));
				assert!(html.is_none());
			}
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn rejects_out_of_range_nu() {
		assert!(parse_nu("0").is_err());
		assert!(parse_nu("1.5").is_err());
		assert_eq!(parse_nu("1"), Ok(1.0));
	}
}
