//! Application configuration and constants

use std::path::PathBuf;
use std::sync::OnceLock;

static CUSTOM_MODEL_DIR: OnceLock<PathBuf> = OnceLock::new();

// === Embedding Model ===
pub const DEFAULT_MODEL: &str = "avsolatorio/GIST-small-Embedding-v0";
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER: &str = "tokenizer.json";
pub const HF_BASE_URL: &str = "https://huggingface.co";
pub const MAX_TOKENS: usize = 512;
pub const EMBED_BATCH_SIZE: usize = 32;

// === Ranking Defaults ===
pub const DEFAULT_MIN_SCORE: f64 = -0.1;
pub const DEFAULT_NU: f64 = 0.1;

// === arXiv ===
pub const ARXIV_RSS_URL: &str = "https://rss.arxiv.org/atom";
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
pub const ARXIV_ID_BATCH: usize = 50;
pub const DEBUG_PAPER_COUNT: usize = 5;
pub const DEBUG_QUERY: &str = "cat:cs.AI";

// === Zotero ===
pub const ZOTERO_API_URL: &str = "https://api.zotero.org";
pub const ZOTERO_PAGE_SIZE: usize = 100;
pub const ZOTERO_ITEM_TYPES: &str = "conferencePaper || journalArticle || preprint";

// === Network ===
pub const HTTP_TIMEOUT_SECS: u64 = 60;
pub const USER_AGENT: &str = concat!("arxiv-digest/", env!("CARGO_PKG_VERSION"));

// === Digest ===
pub const AUTHOR_LIMIT: usize = 5;

pub fn set_model_dir(path: PathBuf) {
	let _ = CUSTOM_MODEL_DIR.set(path);
}

/// Models directory: `--model-dir`, then `DIGEST_MODELS_DIR`, then
/// `models/` next to the executable, then the user cache directory.
pub fn models_dir() -> PathBuf {
	if let Some(custom) = CUSTOM_MODEL_DIR.get() {
		crate::ui::debug(&format!("Using custom model dir: {}", custom.display()));
		return custom.clone();
	}

	if let Ok(env_path) = std::env::var("DIGEST_MODELS_DIR") {
		if !env_path.is_empty() {
			crate::ui::debug(&format!("Using DIGEST_MODELS_DIR: {}", env_path));
			return PathBuf::from(env_path);
		}
	}

	if let Ok(exe) = std::env::current_exe() {
		if let Some(dir) = exe.parent() {
			let models = dir.join("models");
			if models.is_dir() {
				crate::ui::debug(&format!("Found models at: {}", models.display()));
				return models;
			}
		}
	}

	cache_dir().join("models")
}

/// Platform cache dir for the app; the temp dir when no home directory is known.
fn cache_dir() -> PathBuf {
	directories::ProjectDirs::from("", "", "arxiv-digest")
		.map(|dirs| dirs.cache_dir().to_path_buf())
		.unwrap_or_else(|| std::env::temp_dir().join("arxiv-digest"))
}

/// Directory holding one model's files; `org/name` becomes `org--name`.
pub fn model_dir(model_id: &str) -> PathBuf {
	models_dir().join(model_id.replace('/', "--"))
}

pub fn model_path(model_id: &str) -> PathBuf {
	model_dir(model_id).join(MODEL_FILE)
}

pub fn tokenizer_path(model_id: &str) -> PathBuf {
	model_dir(model_id).join(TOKENIZER)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cache_dir_is_absolute_and_named() {
		let dir = cache_dir();
		assert!(dir.is_absolute(), "{} is relative", dir.display());
		assert!(dir.to_string_lossy().contains("arxiv-digest"));
	}

	#[test]
	fn model_ids_become_single_directories() {
		let path = model_path("org/name");
		assert!(path.ends_with("org--name/model.onnx"));
	}
}
