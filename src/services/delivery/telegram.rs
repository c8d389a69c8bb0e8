/// Telegram Bot API messenger
///
/// Posts to `sendPhoto` and `sendMessage` for a single configured chat.
use crate::{
    error::{AppError, AppResult},
    services::delivery::Messenger,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PARSE_MODE: &str = "Markdown";

#[derive(Debug, Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

/// Envelope every Bot API method returns
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramMessenger {
    http_client: HttpClient,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramMessenger {
    pub fn new(api_url: String, bot_token: String, chat_id: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn call<T: Serialize + ?Sized>(&self, method: &str, payload: &T) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        check_response(method, status.as_u16(), &text)
    }
}

/// The Bot API reports failures in the body as well as the status code
fn check_response(method: &str, status: u16, body: &str) -> AppResult<()> {
    match serde_json::from_str::<BotApiResponse>(body) {
        Ok(parsed) if parsed.ok => Ok(()),
        Ok(parsed) => Err(AppError::Delivery(format!(
            "{} failed ({}): {}",
            method,
            status,
            parsed.description.unwrap_or_else(|| "no description".to_string())
        ))),
        Err(_) => Err(AppError::Delivery(format!(
            "{} returned unparseable response ({}): {}",
            method, status, body
        ))),
    }
}

#[async_trait::async_trait]
impl Messenger for TelegramMessenger {
    async fn send_photo(&self, photo_url: &str, caption: &str) -> AppResult<()> {
        self.call(
            "sendPhoto",
            &SendPhotoRequest {
                chat_id: &self.chat_id,
                photo: photo_url,
                caption,
                parse_mode: PARSE_MODE,
            },
        )
        .await
    }

    async fn send_text(&self, text: &str) -> AppResult<()> {
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id: &self.chat_id,
                text,
                parse_mode: PARSE_MODE,
                disable_web_page_preview: true,
            },
        )
        .await
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
