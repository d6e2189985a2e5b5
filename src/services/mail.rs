//! Outbound mail for email confirmation and password reset.
//!
//! With `MAIL_API_URL` configured, messages are POSTed as JSON to an HTTP mail API
//! (Resend-compatible body: `from`, `to`, `subject`, `html`) using `MAIL_API_KEY` as
//! bearer token. Without it the message is written to the log, which is what local
//! development and the test suite use.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    VerifyEmail,
    ResetPassword,
}

impl MailTemplate {
    pub fn subject(&self) -> &'static str {
        match self {
            MailTemplate::VerifyEmail => "Confirm your email",
            MailTemplate::ResetPassword => "Reset password",
        }
    }

    /// Link the recipient follows, built from the base URL the request came in on.
    pub fn link(&self, base_url: &str, token: &str) -> String {
        let base_url = base_url.trim_end_matches('/');
        match self {
            MailTemplate::VerifyEmail => format!("{}/api/auth/confirmed_email/{}", base_url, token),
            MailTemplate::ResetPassword => format!("{}/api/auth/reset_password?token={}", base_url, token),
        }
    }

    pub fn render(&self, username: &str, link: &str) -> String {
        let username = escape_html(username);
        match self {
            MailTemplate::VerifyEmail => format!(
                "<p>Hi {},</p>\
                 <p>Thanks for signing up. Please confirm your email address:</p>\
                 <p><a href=\"{link}\">{link}</a></p>",
                username,
                link = link
            ),
            MailTemplate::ResetPassword => format!(
                "<p>Hi {},</p>\
                 <p>We received a request to reset your password. Use the link below to choose a new one:</p>\
                 <p><a href=\"{link}\">{link}</a></p>\
                 <p>If you did not ask for this, you can ignore this email.</p>",
                username,
                link = link
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct MailApi {
    url: String,
    api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Mailer {
    from: String,
    api: Option<MailApi>,
    client: Client,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("contactbook/0.1 (+reqwest)")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::InternalServerError(format!("Failed to build mail client: {}", e)))?;

        Ok(Self {
            from: config.from.clone(),
            api: config.api_url.clone().map(|url| MailApi {
                url,
                api_key: config.api_key.clone(),
            }),
            client,
        })
    }

    pub fn compose(&self, template: MailTemplate, to: &str, username: &str, link: &str) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: vec![to.to_string()],
            subject: template.subject().to_string(),
            html: template.render(username, link),
        }
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let Some(api) = &self.api else {
            log::info!(
                "[mail] to={:?} subject={:?}\n{}",
                message.to,
                message.subject,
                message.html
            );
            return Ok(());
        };

        let mut request = self.client.post(&api.url).json(message);
        if let Some(key) = &api.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::InternalServerError(format!("Mail API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::InternalServerError(format!(
                "Mail API answered {}: {}",
                status, body
            )));
        }

        log::debug!("[mail] delivered {:?} to {:?}", message.subject, message.to);
        Ok(())
    }

    /// Sends on a background task. Failures are logged and never reach the caller.
    pub fn send_in_background(&self, message: EmailMessage) {
        let mailer = self.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = mailer.send(&message).await {
                log::error!("Failed to send {:?} to {:?}: {}", message.subject, message.to, e);
            }
        });
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
