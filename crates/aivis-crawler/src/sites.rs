//! Site profiles and the chromiumoxide-backed [`ChatDriver`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use tokio::time::Instant;

use crate::browser::BrowserSession;
use crate::config::CrawlConfig;
use crate::driver::ChatDriver;
use crate::error::CrawlError;

/// How a site signals that a response is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A new response element appearing means the response is done.
    MarkerAppears,
    /// A new response element appears and its text stops changing for the
    /// settle period.
    TextStable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointPolicy {
    Always,
    /// Only when this selector matches after navigation.
    WhenPresent(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteProfile {
    ChatGpt,
    Gemini,
}

impl SiteProfile {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Gemini => "gemini",
        }
    }

    #[must_use]
    pub fn url(self) -> &'static str {
        match self {
            Self::ChatGpt => "https://chat.openai.com",
            Self::Gemini => "https://gemini.google.com/app",
        }
    }

    #[must_use]
    pub fn input_selector(self) -> &'static str {
        match self {
            Self::ChatGpt => r#"[id="prompt-textarea"]"#,
            Self::Gemini => r#"div[role="textbox"]"#,
        }
    }

    /// Send button; `None` submits with Enter.
    #[must_use]
    pub fn send_selector(self) -> Option<&'static str> {
        match self {
            Self::ChatGpt => Some(r#"button[data-testid="send-button"]"#),
            Self::Gemini => None,
        }
    }

    /// Elements holding responses; the last one is the newest.
    #[must_use]
    pub fn response_selector(self) -> &'static str {
        match self {
            Self::ChatGpt => r#"[data-testid="message-response-end"]"#,
            Self::Gemini => ".message-content",
        }
    }

    #[must_use]
    pub fn completion(self) -> Completion {
        match self {
            Self::ChatGpt => Completion::MarkerAppears,
            Self::Gemini => Completion::TextStable,
        }
    }

    #[must_use]
    pub fn checkpoint(self) -> CheckpointPolicy {
        match self {
            Self::ChatGpt => CheckpointPolicy::WhenPresent(r#"[data-testid="login-button"]"#),
            Self::Gemini => CheckpointPolicy::Always,
        }
    }
}

impl fmt::Display for SiteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SiteProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" => Ok(Self::ChatGpt),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("unknown site '{other}': expected chatgpt or gemini")),
        }
    }
}

/// Text-stability tracker for [`Completion::TextStable`].
#[derive(Debug, Default)]
struct Stability {
    last: Option<String>,
    since: Option<Instant>,
}

impl Stability {
    /// Record an observation; true once `text` has been unchanged and non-empty
    /// for at least `settle`.
    fn observe(&mut self, text: &str, now: Instant, settle: Duration) -> bool {
        if text.trim().is_empty() {
            self.last = None;
            self.since = None;
            return false;
        }
        if self.last.as_deref() == Some(text) {
            self.since
                .is_some_and(|since| now.duration_since(since) >= settle)
        } else {
            self.last = Some(text.to_string());
            self.since = Some(now);
            false
        }
    }
}

/// Drives one chat site in a real browser.
///
/// The browser is launched lazily by [`ChatDriver::navigate`], so launch
/// failures surface through the controller's navigation handling.
pub struct BrowserChatDriver {
    profile: SiteProfile,
    config: CrawlConfig,
    session: Option<BrowserSession>,
    page: Option<Page>,
    /// Response elements present before the last submit.
    baseline: usize,
}

impl BrowserChatDriver {
    #[must_use]
    pub fn new(profile: SiteProfile, config: CrawlConfig) -> Self {
        Self {
            profile,
            config,
            session: None,
            page: None,
            baseline: 0,
        }
    }

    fn page(&self) -> Result<&Page, CrawlError> {
        self.page
            .as_ref()
            .ok_or_else(|| CrawlError::BrowserFailure("page is not open".to_string()))
    }

    async fn response_count(&self) -> Result<usize, CrawlError> {
        let page = self.page()?;
        // An empty match set can surface as an error from CDP.
        Ok(page
            .find_elements(self.profile.response_selector())
            .await
            .map(|els| els.len())
            .unwrap_or(0))
    }

    /// Text of the newest response node. A node that detaches or cannot be
    /// read mid-render is [`CrawlError::ExtractionEmpty`].
    async fn last_response_text(&self) -> Result<Option<String>, CrawlError> {
        let page = self.page()?;
        let Ok(elements) = page.find_elements(self.profile.response_selector()).await else {
            return Ok(None);
        };
        let Some(el) = elements.last() else {
            return Ok(None);
        };
        el.inner_text().await.map_err(|e| match CrawlError::from(e) {
            CrawlError::PageElement(reason) => {
                tracing::debug!(site = self.profile.name(), reason = %reason, "response node unreadable");
                CrawlError::ExtractionEmpty
            }
            fatal => fatal,
        })
    }
}

/// Element faults while typing or clicking are [`CrawlError::SubmitFailed`];
/// transport faults keep their fatal classification.
fn submit_error(err: CdpError) -> CrawlError {
    match CrawlError::from(err) {
        CrawlError::PageElement(reason) => CrawlError::SubmitFailed(reason),
        other => other,
    }
}

#[async_trait]
impl ChatDriver for BrowserChatDriver {
    fn name(&self) -> &str {
        self.profile.name()
    }

    async fn navigate(&mut self) -> Result<(), CrawlError> {
        if self.session.is_none() {
            self.session = Some(BrowserSession::launch(&self.config).await?);
        }
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| CrawlError::BrowserFailure("browser session missing".to_string()))?;

        let url = self.profile.url();
        tracing::info!(site = self.profile.name(), url, "navigating");
        let page = session.open_page(url).await?;
        page.wait_for_navigation()
            .await
            .map_err(|e| CrawlError::Navigation(format!("{url}: {e}")))?;
        self.page = Some(page);
        Ok(())
    }

    async fn needs_checkpoint(&mut self) -> Result<bool, CrawlError> {
        match self.profile.checkpoint() {
            CheckpointPolicy::Always => Ok(true),
            CheckpointPolicy::WhenPresent(selector) => {
                Ok(self.page()?.find_element(selector).await.is_ok())
            }
        }
    }

    async fn submit_prompt(&mut self, prompt: &str) -> Result<(), CrawlError> {
        self.baseline = self.response_count().await?;

        let page = self.page()?;
        let input = page
            .find_element(self.profile.input_selector())
            .await
            .map_err(|e| CrawlError::SubmitFailed(format!("input not found: {e}")))?;

        input
            .click()
            .await
            .map_err(submit_error)?;
        input
            .type_str(prompt)
            .await
            .map_err(submit_error)?;

        let send_button = match self.profile.send_selector() {
            Some(selector) => page.find_element(selector).await.ok(),
            None => None,
        };
        match send_button {
            Some(button) => {
                button
                    .click()
                    .await
                    .map_err(submit_error)?;
            }
            None => {
                input
                    .press_key("Enter")
                    .await
                    .map_err(submit_error)?;
            }
        }

        tracing::debug!(site = self.profile.name(), baseline = self.baseline, "prompt submitted");
        Ok(())
    }

    async fn wait_for_response(&mut self) -> Result<(), CrawlError> {
        let mut stability = Stability::default();
        loop {
            if self.response_count().await? > self.baseline {
                match self.profile.completion() {
                    Completion::MarkerAppears => return Ok(()),
                    Completion::TextStable => {
                        // An unreadable node mid-render is "not ready yet".
                        let text = match self.last_response_text().await {
                            Ok(text) => text.unwrap_or_default(),
                            Err(e) if e.is_fatal() => return Err(e),
                            Err(_) => String::new(),
                        };
                        if stability.observe(&text, Instant::now(), self.config.settle) {
                            return Ok(());
                        }
                    }
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn extract_response_text(&mut self) -> Result<String, CrawlError> {
        Ok(self.last_response_text().await?.unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), CrawlError> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "failed to close page");
            }
        }
        if let Some(mut session) = self.session.take() {
            session.close().await;
        }
        Ok(())
    }
}
