//! SMTP delivery of the rendered digest

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

use crate::ui;

const SENDER_NAME: &str = "Github Action";
const RECEIVER_NAME: &str = "You";

#[derive(Debug, Clone)]
pub struct MailSettings {
	pub server: String,
	pub port: u16,
	pub sender: String,
	pub receiver: String,
	pub password: String,
}

pub struct Mailer {
	settings: MailSettings,
}

/// `Daily arXiv 2024/01/31`
pub fn subject_for(date: NaiveDate) -> String {
	format!("Daily arXiv {}", date.format("%Y/%m/%d"))
}

impl Mailer {
	pub fn new(settings: MailSettings) -> Self {
		Self { settings }
	}

	pub fn build_message(&self, html: &str, date: NaiveDate) -> Result<Message> {
		let from: Address = self
			.settings
			.sender
			.parse()
			.with_context(|| format!("Invalid sender address: {}", self.settings.sender))?;
		let to: Address = self
			.settings
			.receiver
			.parse()
			.with_context(|| format!("Invalid receiver address: {}", self.settings.receiver))?;

		Message::builder()
			.from(Mailbox::new(Some(SENDER_NAME.to_string()), from))
			.to(Mailbox::new(Some(RECEIVER_NAME.to_string()), to))
			.subject(subject_for(date))
			.header(ContentType::TEXT_HTML)
			.body(html.to_string())
			.context("Failed to build e-mail")
	}

	/// Send over STARTTLS, falling back to implicit TLS on the same port.
	pub fn send(&self, html: &str) -> Result<()> {
		let message = self.build_message(html, Local::now().date_naive())?;
		let credentials = Credentials::new(self.settings.sender.clone(), self.settings.password.clone());

		let starttls = SmtpTransport::starttls_relay(&self.settings.server)
			.map(|builder| {
				builder
					.port(self.settings.port)
					.credentials(credentials.clone())
					.build()
			})
			.context("Failed to set up STARTTLS transport")
			.and_then(|transport| transport.send(&message).context("STARTTLS delivery failed"));

		match starttls {
			Ok(response) => {
				ui::debug(&format!("SMTP response: {}", response.code()));
				Ok(())
			}
			Err(e) => {
				ui::warn(&format!("Failed to use TLS. {:#}", e));
				ui::warn("Try to use SSL.");

				let transport = SmtpTransport::relay(&self.settings.server)
					.context("Failed to set up TLS transport")?
					.port(self.settings.port)
					.credentials(credentials)
					.build();
				let response = transport.send(&message).context("Failed to send e-mail")?;
				ui::debug(&format!("SMTP response: {}", response.code()));
				Ok(())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mailer(sender: &str) -> Mailer {
		Mailer::new(MailSettings {
			server: "smtp.example.com".to_string(),
			port: 587,
			sender: sender.to_string(),
			receiver: "reader@example.com".to_string(),
			password: "secret".to_string(),
		})
	}

	#[test]
	fn subject_uses_slashed_date() {
		let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
		assert_eq!(subject_for(date), "Daily arXiv 2024/01/31");
	}

	#[test]
	fn message_headers() {
		let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
		let message = mailer("bot@example.com").build_message("<p>hi</p>", date).unwrap();
		let raw = String::from_utf8(message.formatted()).unwrap();

		assert!(raw.contains("Subject: Daily arXiv 2024/01/31"));
		assert!(raw.contains("Github Action"));
		assert!(raw.contains("<bot@example.com>"));
		assert!(raw.contains("<reader@example.com>"));
		assert!(raw.contains("text/html"));
	}

	#[test]
	fn rejects_bad_addresses() {
		let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
		assert!(mailer("not an address").build_message("", date).is_err());
	}
}
