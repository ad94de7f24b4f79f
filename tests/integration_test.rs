// CLI smoke tests for arxiv-digest

use std::process::Command;

fn digest() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_arxiv-digest"));
	// away from any .env in the checkout
	cmd.current_dir(std::env::temp_dir());
	cmd
}

#[test]
fn test_version_display() {
	let output = digest().arg("--version").output().expect("Failed to run arxiv-digest --version");

	assert!(output.status.success(), "Version command failed");

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("arxiv-digest"), "Expected 'arxiv-digest' in version output");
	assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_display() {
	let output = digest().arg("--help").output().expect("Failed to run arxiv-digest --help");

	assert!(output.status.success(), "Help command failed");

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(
		stdout.contains("digest") && stdout.contains("preview"),
		"Expected digest and preview in help output"
	);
}

#[test]
fn test_help_subcommand() {
	let output = digest().args(["help", "digest"]).output().expect("Failed to run arxiv-digest help digest");

	assert!(output.status.success(), "Help subcommand failed");

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("--zotero-id"));
	assert!(stdout.contains("--smtp-server"));
	assert!(stdout.contains("--send-empty"));
}

#[test]
fn test_missing_required_options() {
	let output = digest()
		.arg("preview")
		.env_remove("ZOTERO_ID")
		.env_remove("ZOTERO_KEY")
		.env_remove("ARXIV_QUERY")
		.output()
		.expect("Failed to run arxiv-digest preview");

	assert!(!output.status.success(), "Preview without options should fail");

	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("--zotero-id"), "Expected the missing option to be named");
}

#[test]
fn test_rejects_invalid_nu() {
	let output = digest()
		.args([
			"preview",
			"--zotero-id",
			"1",
			"--zotero-key",
			"k",
			"--arxiv-query",
			"cs.AI",
			"--nu",
			"2",
		])
		.output()
		.expect("Failed to run arxiv-digest preview");

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("nu must be in (0, 1]"));
}

#[test]
fn test_json_export_keeps_stdout_clean() {
	// unreachable proxy: the run fails at the first request
	let output = digest()
		.args([
			"preview",
			"--zotero-id",
			"1",
			"--zotero-key",
			"k",
			"--arxiv-query",
			"cs.AI",
			"--export",
			"-",
		])
		.env("HTTPS_PROXY", "http://127.0.0.1:9")
		.env("https_proxy", "http://127.0.0.1:9")
		.env_remove("NO_PROXY")
		.env_remove("no_proxy")
		.output()
		.expect("Failed to run arxiv-digest preview");

	assert!(!output.status.success());
	assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));

	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("Retrieving Zotero corpus"));
}
