//! Chrome process lifecycle for one crawl.
//!
//! The CDP handler stream must be polled for the browser to make progress, so
//! it runs in a tracked task that is aborted when the session ends.

use std::path::{Path, PathBuf};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::CrawlConfig;
use crate::error::CrawlError;

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// `None` for a persistent profile.
    temp_profile: Option<TempProfile>,
    closed: bool,
}

impl BrowserSession {
    /// Launch Chrome with the configured profile and head mode.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::BrowserFailure`] if the profile directory cannot be
    /// created or Chrome fails to start.
    pub async fn launch(config: &CrawlConfig) -> Result<Self, CrawlError> {
        // The guard exists before the first await, so a cancelled launch still
        // removes the directory.
        let (profile_dir, temp_profile) = match &config.profile_dir {
            Some(dir) => (dir.clone(), None),
            None => {
                let temp = TempProfile::new();
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        std::fs::create_dir_all(&profile_dir).map_err(|e| {
            CrawlError::BrowserFailure(format!(
                "failed to create profile dir {}: {e}",
                profile_dir.display()
            ))
        })?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(config.navigation_timeout)
            .window_size(1280, 900)
            .user_data_dir(&profile_dir)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-notifications");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(CrawlError::BrowserFailure)?;

        tracing::info!(
            headless = config.headless,
            profile = %profile_dir.display(),
            "launching browser"
        );

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlError::BrowserFailure(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler error");
                }
            }
            tracing::debug!("browser handler finished");
        });

        Ok(Self {
            browser,
            handler,
            temp_profile,
            closed: false,
        })
    }

    /// # Errors
    ///
    /// Returns [`CrawlError::Navigation`] if the page cannot be opened.
    pub async fn open_page(&self, url: &str) -> Result<Page, CrawlError> {
        self.browser
            .new_page(url)
            .await
            .map_err(|e| CrawlError::Navigation(format!("{url}: {e}")))
    }

    /// Close Chrome, wait for the process to exit, stop the handler and remove
    /// a temp profile. Idempotent; failures are logged, not returned.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "failed to close browser cleanly");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "failed to wait for browser exit");
        }
        self.handler.abort();
        self.temp_profile = None;
        tracing::info!("browser closed");
    }
}

impl Drop for BrowserSession {
    /// Fields drop in declaration order: `browser` kills the Chrome child
    /// before `temp_profile` removes its directory.
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("browser session dropped without close; aborting handler");
        }
        self.handler.abort();
    }
}

/// Throwaway profile directory, removed on drop.
#[derive(Debug)]
struct TempProfile(PathBuf);

impl TempProfile {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("aivis-chrome-{}", uuid::Uuid::new_v4())))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempProfile {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.0) {
            Ok(()) => tracing::debug!(path = %self.0.display(), "temp profile removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.0.display(), error = %e, "failed to remove temp profile");
            }
        }
    }
}
