//! Fetch model files from the Hugging Face hub when they are missing

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use crate::config::{HF_BASE_URL, USER_AGENT};
use crate::ui;

/// Hub path of the ONNX export inside a model repository
const REMOTE_MODEL: &str = "onnx/model.onnx";
const REMOTE_TOKENIZER: &str = "tokenizer.json";

pub fn ensure_model(model_id: &str, model_path: &Path, tokenizer_path: &Path) -> Result<()> {
	if model_path.exists() && tokenizer_path.exists() {
		return Ok(());
	}

	ui::info(&format!("Downloading {} from the Hugging Face hub...", model_id));
	let client = reqwest::blocking::Client::builder()
		.user_agent(USER_AGENT)
		.timeout(Duration::from_secs(600))
		.build()
		.context("Failed to build HTTP client")?;

	if !tokenizer_path.exists() {
		fetch(&client, &file_url(model_id, REMOTE_TOKENIZER), tokenizer_path)?;
	}
	if !model_path.exists() {
		fetch(&client, &file_url(model_id, REMOTE_MODEL), model_path)?;
	}

	ui::success(&format!("Model files saved to {}", ui::path_link(model_path, 60)));
	Ok(())
}

pub fn file_url(model_id: &str, file: &str) -> String {
	format!("{}/{}/resolve/main/{}", HF_BASE_URL, model_id, file)
}

/// Stream `url` into `dest` through a `.part` file so a failed download
/// never leaves a truncated model behind.
fn fetch(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<()> {
	if let Some(parent) = dest.parent() {
		fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
	}

	ui::debug(&format!("GET {}", url));
	let mut response = client
		.get(url)
		.send()
		.and_then(|r| r.error_for_status())
		.with_context(|| format!("Failed to download {}", url))?;

	let partial = dest.with_extension("part");
	let mut file = File::create(&partial).with_context(|| format!("Failed to create {}", partial.display()))?;
	let bytes = response
		.copy_to(&mut file)
		.with_context(|| format!("Failed to write {}", partial.display()))?;
	fs::rename(&partial, dest).with_context(|| format!("Failed to move {} into place", dest.display()))?;

	ui::debug(&format!("Saved {} ({:.1} MB)", dest.display(), bytes as f64 / 1_048_576.0));
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_hub_urls() {
		assert_eq!(
			file_url("avsolatorio/GIST-small-Embedding-v0", REMOTE_MODEL),
			"https://huggingface.co/avsolatorio/GIST-small-Embedding-v0/resolve/main/onnx/model.onnx"
		);
	}

	#[test]
	fn present_files_need_no_network() {
		let dir = tempfile::tempdir().unwrap();
		let model = dir.path().join("model.onnx");
		let tokenizer = dir.path().join("tokenizer.json");
		fs::write(&model, b"onnx").unwrap();
		fs::write(&tokenizer, b"{}").unwrap();

		assert!(ensure_model("unused/model", &model, &tokenizer).is_ok());
	}
}
