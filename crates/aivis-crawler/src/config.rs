use std::path::PathBuf;
use std::time::Duration;

use aivis_core::AppConfig;

/// Timing and browser settings for one crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub navigation_timeout: Duration,
    /// Bound on a single prompt's response wait.
    pub response_timeout: Duration,
    pub inter_prompt_delay: Duration,
    /// Quiet period for drivers that detect completion by text stabilising.
    pub settle: Duration,
    /// How often drivers re-check the page while waiting.
    pub poll_interval: Duration,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    /// Persistent profile; a temp profile is created and removed otherwise.
    pub profile_dir: Option<PathBuf>,
    pub context_chars: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            response_timeout: Duration::from_secs(60),
            inter_prompt_delay: Duration::from_millis(2000),
            settle: Duration::from_millis(1500),
            poll_interval: Duration::from_millis(500),
            headless: false,
            chrome_path: None,
            profile_dir: None,
            context_chars: aivis_analysis::DEFAULT_CONTEXT_CHARS,
        }
    }
}

impl CrawlConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(config.crawl_navigation_timeout_secs),
            response_timeout: Duration::from_secs(config.crawl_response_timeout_secs),
            inter_prompt_delay: Duration::from_millis(config.crawl_inter_prompt_delay_ms),
            settle: Duration::from_millis(config.crawl_settle_ms),
            headless: config.crawl_headless,
            chrome_path: config.chrome_path.clone(),
            profile_dir: config.crawl_profile_dir.clone(),
            context_chars: config.mention_context_chars,
            ..Self::default()
        }
    }
}
