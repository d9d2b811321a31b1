//! Sequential crawl state machine.
//!
//! `Idle -> Navigating -> AwaitingManualCheckpoint -> (Submitting ->
//! WaitingForResponse -> Extracting)* -> Completed | Failed`
//!
//! Prompts run one at a time because they share the chat's conversation. A
//! prompt-level failure is recorded and the loop moves on; a session-level
//! failure ends the loop. Either way the driver is closed and every result
//! gathered so far is returned.

use aivis_analysis::{analyze_response, MatchOptions};
use aivis_core::{BrandSet, PromptResult};
use tokio::sync::mpsc::UnboundedSender;

use crate::checkpoint::{CheckpointListener, OperatorSignal};
use crate::config::CrawlConfig;
use crate::driver::ChatDriver;
use crate::error::CrawlError;
use crate::events::{CrawlEvent, CrawlState, EventSink};

/// A prompt that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFailure {
    pub index: usize,
    pub prompt: String,
    pub reason: CrawlError,
}

/// Outcome of one crawl. Returned on every path, including fatal ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRun {
    pub state: CrawlState,
    /// One entry per processed prompt, in prompt order. Failed prompts appear
    /// as empty, zero-mention results.
    pub results: Vec<PromptResult>,
    pub failures: Vec<PromptFailure>,
    /// The fatal error when `state` is [`CrawlState::Failed`].
    pub error: Option<CrawlError>,
}

impl CrawlRun {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == CrawlState::Completed
    }
}

pub struct CrawlController<D: ChatDriver> {
    driver: D,
    config: CrawlConfig,
    checkpoint: CheckpointListener,
    events: EventSink,
}

impl<D: ChatDriver> CrawlController<D> {
    #[must_use]
    pub fn new(driver: D, config: CrawlConfig, checkpoint: CheckpointListener) -> Self {
        Self {
            driver,
            config,
            checkpoint,
            events: EventSink::default(),
        }
    }

    /// Stream progress events to `tx` in addition to the log.
    #[must_use]
    pub fn with_events(mut self, tx: UnboundedSender<CrawlEvent>) -> Self {
        self.events = EventSink::new(Some(tx));
        self
    }

    /// Run every prompt through the driver and match `brands` in each
    /// response. Never returns early: the driver is closed on every path.
    pub async fn run(mut self, prompts: &[String], brands: &BrandSet) -> CrawlRun {
        let site = self.driver.name().to_string();
        tracing::info!(site = %site, prompts = prompts.len(), "crawl starting");
        self.events.emit(CrawlEvent::StateChanged(CrawlState::Idle));

        let mut results = Vec::with_capacity(prompts.len());
        let mut failures = Vec::new();
        let outcome = self.drive(prompts, brands, &mut results, &mut failures).await;

        if let Err(e) = self.driver.close().await {
            tracing::warn!(site = %site, error = %e, "failed to close driver");
        }

        let (state, error) = match outcome {
            Ok(()) => (CrawlState::Completed, None),
            Err(e) => {
                tracing::error!(
                    site = %site,
                    error = %e,
                    processed = results.len(),
                    "crawl failed; keeping partial results"
                );
                (CrawlState::Failed, Some(e))
            }
        };
        self.transition(state);
        self.events.emit(CrawlEvent::Finished {
            state,
            processed: results.len(),
            failed: failures.len(),
        });

        CrawlRun {
            state,
            results,
            failures,
            error,
        }
    }

    async fn drive(
        &mut self,
        prompts: &[String],
        brands: &BrandSet,
        results: &mut Vec<PromptResult>,
        failures: &mut Vec<PromptFailure>,
    ) -> Result<(), CrawlError> {
        self.transition(CrawlState::Navigating);
        let nav_timeout = self.config.navigation_timeout;
        match tokio::time::timeout(nav_timeout, self.driver.navigate()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(CrawlError::NavigationTimeout {
                    site: self.driver.name().to_string(),
                    timeout: nav_timeout,
                })
            }
        }

        if self.driver.needs_checkpoint().await? {
            self.transition(CrawlState::AwaitingManualCheckpoint);
            self.events.emit(CrawlEvent::CheckpointRequired {
                site: self.driver.name().to_string(),
            });
            if self.checkpoint.wait().await == OperatorSignal::Abort {
                return Err(CrawlError::Aborted);
            }
            tracing::info!(site = self.driver.name(), "operator resumed crawl");
        }

        for (index, prompt) in prompts.iter().enumerate() {
            if self.checkpoint.is_aborted() {
                return Err(CrawlError::Aborted);
            }

            match self.process_prompt(index, prompt, brands).await {
                Ok(result) => {
                    self.events.emit(CrawlEvent::PromptSucceeded {
                        index,
                        prompt: prompt.clone(),
                        mentions: result.mentions.len(),
                    });
                    results.push(result);
                    if index + 1 < prompts.len() && !self.config.inter_prompt_delay.is_zero() {
                        tokio::time::sleep(self.config.inter_prompt_delay).await;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.events.emit(CrawlEvent::PromptFailed {
                        index,
                        prompt: prompt.clone(),
                        reason: e.to_string(),
                    });
                    results.push(PromptResult::failed(prompt.clone()));
                    failures.push(PromptFailure {
                        index,
                        prompt: prompt.clone(),
                        reason: e,
                    });
                }
            }
        }

        Ok(())
    }

    async fn process_prompt(
        &mut self,
        index: usize,
        prompt: &str,
        brands: &BrandSet,
    ) -> Result<PromptResult, CrawlError> {
        self.transition(CrawlState::Submitting(index));
        self.driver.submit_prompt(prompt).await?;

        self.transition(CrawlState::WaitingForResponse(index));
        let response_timeout = self.config.response_timeout;
        tokio::time::timeout(response_timeout, self.driver.wait_for_response())
            .await
            .map_err(|_| CrawlError::PromptTimeout(response_timeout))??;

        self.transition(CrawlState::Extracting(index));
        let text = match self.driver.extract_response_text().await {
            Ok(text) => text,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(prompt_index = index, error = %e, "response could not be read");
                return Err(CrawlError::ExtractionEmpty);
            }
        };
        if text.trim().is_empty() {
            return Err(CrawlError::ExtractionEmpty);
        }

        let options = MatchOptions {
            context_chars: self.config.context_chars,
        };
        Ok(analyze_response(prompt, &text, brands, options))
    }

    fn transition(&self, next: CrawlState) {
        self.events.emit(CrawlEvent::StateChanged(next));
    }
}
