//! Digest command - rank and e-mail

use anyhow::Result;

use super::pipeline;
use crate::cli::{MailArgs, RankArgs};
use crate::digest::{render_digest, MailSettings, Mailer};
use crate::ui;

pub fn run(rank: &RankArgs, mail: &MailArgs, send_empty: bool, debug: bool) -> Result<()> {
	let report = pipeline::run(rank, debug)?;

	if !report.has_papers() && !send_empty {
		ui::info(&format!(
			"No papers found above the threshold {} (out of {} papers). Exit.",
			report.global.threshold, report.global.papers_considered
		));
		return Ok(());
	}

	let html = render_digest(&report);

	ui::info("Sending email...");
	let mailer = Mailer::new(MailSettings {
		server: mail.smtp_server.clone(),
		port: mail.smtp_port,
		sender: mail.sender.clone(),
		receiver: mail.receiver.clone(),
		password: mail.sender_password.clone(),
	});
	mailer.send(&html)?;

	ui::success("Email sent successfully! If you don't receive the email, please check the configuration and the junk box.");
	Ok(())
}
