use async_trait::async_trait;

use crate::error::CrawlError;

/// One chat interface the controller can drive.
///
/// Drivers describe what "ready" means for their site; the controller owns
/// the timeouts, the checkpoint and the per-prompt failure policy. Calls
/// arrive strictly in order: `navigate`, `needs_checkpoint`, then
/// `submit_prompt` / `wait_for_response` / `extract_response_text` per
/// prompt, and `close` on every exit path.
#[async_trait]
pub trait ChatDriver: Send {
    /// Site name used in logs and events.
    fn name(&self) -> &str;

    /// Open the chat interface. Errors here are fatal to the run.
    async fn navigate(&mut self) -> Result<(), CrawlError>;

    /// Whether the operator must act (log in, solve a challenge) before the
    /// first prompt.
    async fn needs_checkpoint(&mut self) -> Result<bool, CrawlError>;

    async fn submit_prompt(&mut self, prompt: &str) -> Result<(), CrawlError>;

    /// Resolve once the response to the last submitted prompt is complete.
    /// May wait indefinitely; the caller bounds it.
    async fn wait_for_response(&mut self) -> Result<(), CrawlError>;

    async fn extract_response_text(&mut self) -> Result<String, CrawlError>;

    /// Release the browser. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), CrawlError>;
}
