use async_trait::async_trait;
use common::DeliveryConfig;
use serde::Serialize;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::DeliveryError;

/// Receiver of the final message.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Writes the message to stdout.
#[derive(Debug, Default)]
pub struct StdoutDelivery;

#[async_trait]
impl Delivery for StdoutDelivery {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Telegram Bot API `sendMessage`.
pub struct TelegramDelivery {
    api_url: String,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramDelivery {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            api_url: api_url.into(),
            token: token.into(),
            chat_id: chat_id.into(),
            client,
        }
    }

    /// Token and chat id come from the env vars named in the config.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DeliveryError::Configuration(format!("{} is not configured", name)))
        };
        let token = read(&config.token_env)?;
        let chat_id = read(&config.chat_id_env)?;
        Ok(Self::new(config.telegram_api_url.clone(), token, chat_id))
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url.trim_end_matches('/'), self.token)
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: true,
        };
        let response = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        info!(chars = text.chars().count(), "message sent to Telegram");
        Ok(())
    }
}

/// Delivery selected by `delivery.kind`.
pub fn create_delivery(config: &DeliveryConfig) -> Result<Box<dyn Delivery>, DeliveryError> {
    match config.kind.as_str() {
        "stdout" => Ok(Box::new(StdoutDelivery)),
        "telegram" => Ok(Box::new(TelegramDelivery::from_config(config)?)),
        other => Err(DeliveryError::Configuration(format!(
            "unknown delivery kind: {}",
            other
        ))),
    }
}
