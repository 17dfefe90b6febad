//! Telegram bot delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use signal_core::error::NotifyError;
use signal_core::traits::Notifier;
use tracing::{debug, warn};

/// Bot API endpoint
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// One bot token paired with one chat.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramDestination {
    pub token: String,
    pub chat_id: String,
}

// Tokens are credentials and stay out of logs
impl std::fmt::Debug for TelegramDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramDestination")
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Pair comma-separated tokens and chat ids by position.
///
/// Blank entries are ignored; a token without a chat id at the same
/// position is skipped.
pub fn parse_destinations(tokens: &str, chat_ids: &str) -> Vec<TelegramDestination> {
    let chat_ids: Vec<&str> = chat_ids.split(',').map(str::trim).collect();

    tokens
        .split(',')
        .map(str::trim)
        .enumerate()
        .filter(|(_, token)| !token.is_empty())
        .filter_map(|(i, token)| match chat_ids.get(i).filter(|id| !id.is_empty()) {
            Some(chat_id) => Some(TelegramDestination {
                token: token.to_string(),
                chat_id: chat_id.to_string(),
            }),
            None => {
                warn!(position = i + 1, "Bot token has no chat id, skipped");
                None
            }
        })
        .collect()
}

/// Read destinations from two environment variables.
pub fn destinations_from_env(
    tokens_var: &str,
    chat_ids_var: &str,
) -> Result<Vec<TelegramDestination>, NotifyError> {
    let read = |name: &str| {
        std::env::var(name)
            .map_err(|_| NotifyError::Configuration(format!("{} environment variable not set", name)))
    };
    let destinations = parse_destinations(&read(tokens_var)?, &read(chat_ids_var)?);
    if destinations.is_empty() {
        return Err(NotifyError::Configuration(format!(
            "No usable destination in {} / {}",
            tokens_var, chat_ids_var
        )));
    }
    Ok(destinations)
}

/// Delivery settings shared by every destination.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub parse_mode: String,
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: TELEGRAM_API_URL.to_string(),
            parse_mode: "Markdown".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// One Telegram destination.
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
    destination: TelegramDestination,
    name: String,
}

impl TelegramNotifier {
    pub fn new(destination: TelegramDestination, config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, destination, config))
    }

    /// Build a notifier that shares an existing HTTP client.
    pub fn with_client(client: Client, destination: TelegramDestination, config: TelegramConfig) -> Self {
        let name = format!("telegram:{}", destination.chat_id);
        Self {
            client,
            config,
            destination,
            name,
        }
    }

    /// One notifier per destination over a single HTTP client.
    pub fn for_destinations(
        destinations: Vec<TelegramDestination>,
        config: TelegramConfig,
    ) -> Result<Vec<Self>, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(destinations
            .into_iter()
            .map(|d| Self::with_client(client.clone(), d, config.clone()))
            .collect())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.destination.token
        );
        let body = SendMessage {
            chat_id: &self.destination.chat_id,
            text,
            parse_mode: &self.config.parse_mode,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        let reply: Option<ApiResponse> = response.json().await.ok();
        match reply {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!(destination = %self.name, "Telegram message delivered");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => Err(NotifyError::Rejected(format!(
                "status {}: {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(NotifyError::Rejected(format!(
                "status {}: unreadable response",
                status.as_u16()
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
