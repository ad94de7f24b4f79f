//! arxiv-digest - daily arXiv recommendations from your Zotero library

use anyhow::Result;
use clap::{CommandFactory, Parser};

use arxiv_digest::cli::{Cli, Command};
use arxiv_digest::commands;
use arxiv_digest::{config, runtime, ui};

fn main() {
	// `.env` values win over the inherited environment
	let env_file = dotenvy::dotenv_override();

	let cli = Cli::parse();

	ui::Log::set_verbose(cli.debug);
	if let Ok(path) = &env_file {
		ui::debug(&format!("Loaded environment from {}", path.display()));
	}

	if let Err(e) = run(cli) {
		ui::error(&format!("{:#}", e));
		std::process::exit(1);
	}
}

fn run(cli: Cli) -> Result<()> {
	runtime::set_provider(cli.provider);
	if let Some(dir) = cli.model_dir {
		config::set_model_dir(dir);
	}

	match cli.command {
		Command::Digest { rank, mail, send_empty } => {
			ui::banner();
			if cli.debug {
				ui::debug("Debug mode is on.");
			}
			commands::digest::run(&rank, &mail, send_empty, cli.debug)
		}
		Command::Preview { rank, export, html } => {
			if export.as_deref() == Some("-") {
				ui::Log::set_stderr(true);
			}
			ui::banner();
			commands::preview::run(&rank, export.as_deref(), html.as_deref(), cli.debug)
		}
		Command::Help { subcommand } => {
			let mut cmd = Cli::command();
			match subcommand {
				Some(sub) => match cmd.find_subcommand_mut(&sub) {
					Some(sub_cmd) => sub_cmd.print_help()?,
					None => {
						ui::error(&format!("Unknown subcommand: {}", sub));
						cmd.print_help()?;
					}
				},
				None => cmd.print_help()?,
			}
			Ok(())
		}
	}
}
