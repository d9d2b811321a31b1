use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrawlError {
    #[error("navigation to {site} timed out after {timeout:?}")]
    NavigationTimeout { site: String, timeout: Duration },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser failure: {0}")]
    BrowserFailure(String),

    #[error("crawl aborted by operator")]
    Aborted,

    #[error("no response within {0:?}")]
    PromptTimeout(Duration),

    #[error("response text was empty")]
    ExtractionEmpty,

    #[error("could not submit prompt: {0}")]
    SubmitFailed(String),

    /// A DOM query or property read failed while the browser stayed up.
    #[error("page element unavailable: {0}")]
    PageElement(String),
}

impl CrawlError {
    /// Fatal errors end the run; the rest are recorded against one prompt.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NavigationTimeout { .. }
                | Self::Navigation(_)
                | Self::BrowserFailure(_)
                | Self::Aborted
        )
    }
}

/// Transport, channel and launch faults mean the browser is gone. Everything
/// else is scoped to a node or a single CDP call.
impl From<CdpError> for CrawlError {
    fn from(err: CdpError) -> Self {
        match &err {
            CdpError::Ws(_)
            | CdpError::Io(_)
            | CdpError::NoResponse
            | CdpError::UnexpectedWsMessage(_)
            | CdpError::ChannelSendError(_)
            | CdpError::LaunchExit(..)
            | CdpError::LaunchTimeout(_)
            | CdpError::LaunchIo(..) => Self::BrowserFailure(err.to_string()),
            _ => Self::PageElement(err.to_string()),
        }
    }
}
