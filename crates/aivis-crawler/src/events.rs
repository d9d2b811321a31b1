//! Controller states and the progress event stream.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

/// Where the controller is in a run. Per-prompt states carry the zero-based
/// prompt index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Navigating,
    AwaitingManualCheckpoint,
    Submitting(usize),
    WaitingForResponse(usize),
    Extracting(usize),
    Completed,
    Failed,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Navigating => f.write_str("navigating"),
            Self::AwaitingManualCheckpoint => f.write_str("awaiting_manual_checkpoint"),
            Self::Submitting(i) => write!(f, "submitting[{i}]"),
            Self::WaitingForResponse(i) => write!(f, "waiting_for_response[{i}]"),
            Self::Extracting(i) => write!(f, "extracting[{i}]"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    StateChanged(CrawlState),
    /// The operator must log in or clear a challenge, then resume.
    CheckpointRequired {
        site: String,
    },
    PromptSucceeded {
        index: usize,
        prompt: String,
        mentions: usize,
    },
    PromptFailed {
        index: usize,
        prompt: String,
        reason: String,
    },
    Finished {
        state: CrawlState,
        processed: usize,
        failed: usize,
    },
}

/// Optional event channel. Every event is also traced; a dropped receiver is
/// not an error.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<UnboundedSender<CrawlEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: Option<UnboundedSender<CrawlEvent>>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, event: CrawlEvent) {
        match &event {
            CrawlEvent::StateChanged(state) => {
                tracing::debug!(state = %state, "crawl state changed");
            }
            CrawlEvent::CheckpointRequired { site } => {
                tracing::info!(site = %site, "manual checkpoint required");
            }
            CrawlEvent::PromptSucceeded {
                index, mentions, ..
            } => {
                tracing::info!(prompt_index = index, mentions, "prompt processed");
            }
            CrawlEvent::PromptFailed { index, reason, .. } => {
                tracing::warn!(prompt_index = index, error = %reason, "prompt failed");
            }
            CrawlEvent::Finished {
                state,
                processed,
                failed,
            } => {
                tracing::info!(state = %state, processed, failed, "crawl finished");
            }
        }

        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
