//! Execution provider selection
//!
//! `--provider` is turned into an ordered list of accelerators. The first one
//! that registers wins; an empty list or no success leaves the session on CPU.

use anyhow::{Context, Result};
use ort::ep::ExecutionProvider;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::ui;

pub use crate::cli::Provider;

static SELECTED_PROVIDER: OnceLock<Provider> = OnceLock::new();
static ANNOUNCED: AtomicBool = AtomicBool::new(false);

const INTRA_THREADS: usize = 4;

pub fn set_provider(p: Provider) {
	let _ = SELECTED_PROVIDER.set(p);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accelerator {
	Cuda,
	#[cfg(target_os = "macos")]
	CoreMl,
	Xnnpack,
}

impl Accelerator {
	fn name(self) -> &'static str {
		match self {
			Accelerator::Cuda => "CUDA",
			#[cfg(target_os = "macos")]
			Accelerator::CoreMl => "CoreML",
			Accelerator::Xnnpack => "XNNPACK",
		}
	}

	fn attach_to(self, builder: &mut SessionBuilder) -> Result<(), String> {
		match self {
			Accelerator::Cuda => attach(ort::ep::CUDA::default(), builder),
			#[cfg(target_os = "macos")]
			Accelerator::CoreMl => attach(ort::ep::CoreML::default(), builder),
			Accelerator::Xnnpack => attach(ort::ep::XNNPACK::default(), builder),
		}
	}
}

fn attach<P: ExecutionProvider>(provider: P, builder: &mut SessionBuilder) -> Result<(), String> {
	if !provider.is_available().unwrap_or(false) {
		return Err("not available".to_string());
	}
	provider.register(builder).map_err(|e| e.to_string())
}

/// Accelerators to try for `provider`, best first
fn plan(provider: Provider) -> Vec<Accelerator> {
	let mut order = Vec::new();
	match provider {
		Provider::Cpu => {}
		Provider::Cuda => order.push(Accelerator::Cuda),
		Provider::Xnnpack => order.push(Accelerator::Xnnpack),
		Provider::Coreml => {
			#[cfg(target_os = "macos")]
			order.push(Accelerator::CoreMl);
		}
		Provider::Auto => {
			order.push(Accelerator::Cuda);
			#[cfg(target_os = "macos")]
			order.push(Accelerator::CoreMl);
			order.push(Accelerator::Xnnpack);
		}
	}
	order
}

fn announce(message: &str) {
	if !ANNOUNCED.swap(true, Ordering::Relaxed) {
		ui::info(message);
	}
}

pub fn create_session(model_path: &Path) -> Result<Session> {
	let provider = SELECTED_PROVIDER.get().copied().unwrap_or_default();
	let mut builder = Session::builder().context("Failed to create session builder")?;

	let chosen = plan(provider).into_iter().find(|acc| match acc.attach_to(&mut builder) {
		Ok(()) => true,
		Err(reason) => {
			ui::debug(&format!("{}: {}", acc.name(), reason));
			false
		}
	});

	match chosen {
		Some(acc) => announce(&format!("Using {} execution provider", acc.name())),
		None if matches!(provider, Provider::Auto | Provider::Cpu) => announce("Using CPU execution provider"),
		None => ui::warn(&format!("{:?} provider unavailable here, falling back to CPU", provider)),
	}

	builder
		.with_optimization_level(GraphOptimizationLevel::Level3)?
		.with_intra_threads(INTRA_THREADS)?
		.commit_from_file(model_path)
		.context("Failed to load model")
}
