use async_trait::async_trait;

use crate::error::TextGenError;

#[async_trait]
pub trait TextGenApi: Send + Sync {
    /// Whether a credential is configured. When `false`, every call fails
    /// with [`TextGenError::NotConfigured`] without touching the network.
    fn is_configured(&self) -> bool;

    /// One prompt in, the model's text out.
    async fn generate_content(&self, prompt: &str) -> Result<String, TextGenError>;
}
