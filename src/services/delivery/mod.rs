use crate::error::AppResult;

pub mod telegram;

/// Destination channel for notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    /// Sends an image with a Markdown caption
    async fn send_photo(&self, photo_url: &str, caption: &str) -> AppResult<()>;

    /// Sends a Markdown text message
    async fn send_text(&self, text: &str) -> AppResult<()>;

    fn name(&self) -> &'static str;
}
