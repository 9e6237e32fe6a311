//! Telegram Bot API notification backend.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use super::notifier::{Notifier, NotifyError};
use crate::api::errors::truncate;
use crate::config::Settings;

/// Sends alerts with `sendMessage` to a single chat.
pub struct TelegramNotifier {
    endpoint: String,
    chat_id: String,
    parse_mode: Option<String>,
    silent: bool,
    http: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(
        base_url: &str,
        bot_token: &str,
        chat_id: &str,
        parse_mode: Option<String>,
        silent: bool,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: format!(
                "{}/bot{}/sendMessage",
                base_url.trim_end_matches('/'),
                bot_token
            ),
            chat_id: chat_id.to_string(),
            parse_mode: parse_mode.filter(|m| !m.is_empty()),
            silent,
            http,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, NotifyError> {
        Self::new(
            &settings.telegram_base_url,
            &settings.telegram_bot_token,
            &settings.telegram_chat_id,
            Some(settings.parse_mode.clone()),
            settings.telegram_silent,
            settings.request_timeout(),
        )
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        let mut payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if let Some(mode) = &self.parse_mode {
            payload["parse_mode"] = json!(mode);
        }
        if self.silent {
            payload["disable_notification"] = json!(true);
        }
        payload
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&self.payload(text))
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let body = truncate(&body, 200);
            warn!(status = %status, body = %body, "Telegram returned non-success");
            return Err(NotifyError::Rejected {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(parse_mode: &str, silent: bool) -> TelegramNotifier {
        TelegramNotifier::new(
            "https://api.telegram.org/",
            "123:abc",
            "-100",
            Some(parse_mode.to_string()),
            silent,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            notifier("", false).endpoint,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_plain_payload() {
        let payload = notifier("", false).payload("GOAL!");
        assert_eq!(payload, json!({"chat_id": "-100", "text": "GOAL!"}));
    }

    #[test]
    fn test_payload_options() {
        let payload = notifier("HTML", true).payload("GOAL!");
        assert_eq!(payload["parse_mode"], "HTML");
        assert_eq!(payload["disable_notification"], true);
    }
}
