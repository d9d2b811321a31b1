//! Live crawl: drive a chat site, print progress, assemble and optionally store
//! the report.
//!
//! The operator answers the manual checkpoint with Enter. Ctrl-C requests an
//! abort, honoured at the checkpoint or before the next prompt; a second Ctrl-C
//! drops the crawl in place, which closes the browser and its temporary profile.

use std::future::Future;
use std::io::BufRead;

use aivis_analysis::assemble;
use aivis_core::{AppConfig, BrandSet};
use aivis_crawler::{
    checkpoint_channel, BrowserChatDriver, CheckpointHandle, CrawlConfig, CrawlController,
    CrawlEvent, CrawlRun, CrawlState, SiteProfile,
};
use chrono::Utc;
use tokio::sync::mpsc;

use crate::output::format_summary;

/// Run a crawl over the tracked prompts (or `prompt_overrides`).
///
/// # Errors
///
/// Returns an error if the tracking file is invalid, the history store cannot
/// be reached with `save`, or the crawl ends `Failed`. Partial results are
/// printed and stored before a failed crawl is reported.
pub(crate) async fn run_crawl(
    config: &AppConfig,
    site: SiteProfile,
    prompt_overrides: Vec<String>,
    save: bool,
) -> anyhow::Result<()> {
    let tracking = aivis_core::load_tracking(&config.tracking_path)?;
    let brands = tracking.brand_set()?;
    let prompts = select_prompts(tracking.prompts, prompt_overrides)?;

    // Fail on a bad DATABASE_URL before a browser is launched.
    let store = if save {
        Some(RunStore::open(config, site, prompts.len()).await?)
    } else {
        None
    };

    let crawl_config = CrawlConfig::from_app_config(config);
    let driver = BrowserChatDriver::new(site, crawl_config.clone());
    let (handle, listener) = checkpoint_channel();
    let (tx, rx) = mpsc::unbounded_channel();

    let printer = tokio::spawn(print_events(rx, prompts.len()));
    spawn_operator_input(handle.clone());

    let crawl = CrawlController::new(driver, crawl_config, listener)
        .with_events(tx)
        .run(&prompts, &brands);
    let outcome = run_until_interrupted(crawl, &handle, tokio::signal::ctrl_c).await;

    // The event sender lives inside the crawl, so the printer ends once the
    // crawl has finished or been dropped.
    let processed = match printer.await {
        Ok(processed) => processed,
        Err(e) => {
            tracing::warn!(error = %e, "event printer stopped unexpectedly");
            0
        }
    };

    match outcome {
        Some(run) => finish(run, &tracking.category, brands, store).await,
        None => {
            if let Some(store) = store {
                let message = "interrupted by operator".to_string();
                fail_run_best_effort(&store.pool, store.run_id, count(processed), message).await;
            }
            anyhow::bail!("crawl interrupted after {processed} prompt(s); browser closed")
        }
    }
}

/// Drive `crawl` while listening for operator interrupts.
///
/// The first interrupt aborts through the checkpoint handle and lets the crawl
/// wind down; the second drops the crawl future and returns `None`. If the
/// interrupt source itself fails, the crawl runs to completion.
async fn run_until_interrupted<C, S, F>(
    crawl: C,
    handle: &CheckpointHandle,
    mut interrupt: S,
) -> Option<C::Output>
where
    C: Future,
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(crawl);
    let mut aborting = false;
    loop {
        tokio::select! {
            run = &mut crawl => return Some(run),
            signal = interrupt() => {
                if let Err(e) = signal {
                    tracing::warn!(error = %e, "failed to listen for ctrl-c");
                    return Some(crawl.await);
                }
                if aborting {
                    eprintln!("stopping now");
                    tracing::warn!("crawl dropped on second interrupt");
                    return None;
                }
                eprintln!("aborting after the current step; press Ctrl-C again to stop now");
                handle.abort();
                aborting = true;
            }
        }
    }
}

async fn finish(
    run: CrawlRun,
    category: &str,
    brands: BrandSet,
    store: Option<RunStore>,
) -> anyhow::Result<()> {
    for failure in &run.failures {
        println!(
            "prompt {} failed: {} ({})",
            failure.index + 1,
            failure.reason,
            failure.prompt
        );
    }

    let processed = run.results.len();
    let report = if run.results.is_empty() {
        None
    } else {
        Some(assemble(category, brands, run.results, Utc::now())?)
    };

    if let Some(report) = &report {
        println!();
        print!("{}", format_summary(report));
    }

    if let Some(store) = store {
        store
            .record(run.state, processed, run.failures.len(), run.error.as_ref())
            .await;
        if let Some(report) = &report {
            aivis_db::insert_report(&store.pool, report, Some(store.run_id)).await?;
            println!("saved report {}", report.id);
        }
    }

    match run.error {
        Some(e) => Err(anyhow::anyhow!(
            "crawl failed after {processed} prompt(s): {e}"
        )),
        None => Ok(()),
    }
}

fn select_prompts(tracked: Vec<String>, overrides: Vec<String>) -> anyhow::Result<Vec<String>> {
    let prompts: Vec<String> = if overrides.is_empty() {
        tracked
    } else {
        overrides
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    };
    if prompts.is_empty() {
        anyhow::bail!("no prompts to send");
    }
    Ok(prompts)
}

/// `crawl_runs` bookkeeping for a saved crawl.
struct RunStore {
    pool: sqlx::PgPool,
    run_id: i64,
}

impl RunStore {
    async fn open(config: &AppConfig, site: SiteProfile, prompts: usize) -> anyhow::Result<Self> {
        let pool = aivis_db::connect_from_app_config(config).await?;
        let run = aivis_db::create_crawl_run(&pool, site.name(), count(prompts)).await?;
        if let Err(e) = aivis_db::start_crawl_run(&pool, run.id).await {
            fail_run_best_effort(&pool, run.id, 0, format!("{e:#}")).await;
            return Err(e.into());
        }
        tracing::info!(run_id = run.id, site = %site, "crawl run started");
        Ok(Self {
            pool,
            run_id: run.id,
        })
    }

    async fn record(
        &self,
        state: CrawlState,
        processed: usize,
        failed: usize,
        error: Option<&aivis_crawler::CrawlError>,
    ) {
        let (run_id, processed) = (self.run_id, count(processed));
        if state == CrawlState::Completed {
            let result =
                aivis_db::complete_crawl_run(&self.pool, run_id, processed, count(failed)).await;
            if let Err(e) = result {
                tracing::error!(run_id, error = %e, "failed to mark crawl run succeeded");
            }
        } else {
            let message = error.map_or_else(|| format!("crawl ended {state}"), ToString::to_string);
            fail_run_best_effort(&self.pool, run_id, processed, message).await;
        }
    }
}

/// Attempt to mark a crawl run as failed, logging any secondary error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, processed: i32, message: String) {
    if let Err(mark_err) = aivis_db::fail_crawl_run(pool, run_id, processed, &message).await {
        tracing::error!(run_id, error = %mark_err, "failed to mark crawl run as failed");
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Every line on stdin resumes a pending checkpoint. Runs on its own thread so
/// a blocked read never holds up runtime shutdown.
fn spawn_operator_input(handle: CheckpointHandle) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
            handle.resume();
        }
        tracing::debug!("stdin closed; checkpoint can only be aborted with Ctrl-C");
    });
}

/// Print progress lines until the sender is dropped. Returns how many prompts
/// were processed, successful or not.
async fn print_events(mut rx: mpsc::UnboundedReceiver<CrawlEvent>, total: usize) -> usize {
    let mut processed = 0;
    while let Some(event) = rx.recv().await {
        if matches!(
            event,
            CrawlEvent::PromptSucceeded { .. } | CrawlEvent::PromptFailed { .. }
        ) {
            processed += 1;
        }
        if let Some(line) = describe_event(&event, total) {
            println!("{line}");
        }
    }
    processed
}

fn describe_event(event: &CrawlEvent, total: usize) -> Option<String> {
    match event {
        CrawlEvent::StateChanged(CrawlState::Navigating) => {
            Some("opening chat site...".to_string())
        }
        CrawlEvent::StateChanged(CrawlState::Submitting(index)) => {
            Some(format!("[{}/{total}] sending prompt", index + 1))
        }
        CrawlEvent::StateChanged(_) => None,
        CrawlEvent::CheckpointRequired { site } => Some(format!(
            "{site}: log in or clear the challenge in the browser window, then press Enter \
             (Ctrl-C aborts)"
        )),
        CrawlEvent::PromptSucceeded {
            index, mentions, ..
        } => Some(format!(
            "[{}/{total}] response captured, {mentions} mention(s)",
            index + 1
        )),
        CrawlEvent::PromptFailed { index, reason, .. } => {
            Some(format!("[{}/{total}] failed: {reason}", index + 1))
        }
        CrawlEvent::Finished {
            state,
            processed,
            failed,
        } => Some(format!(
            "crawl {state}: {processed} prompt(s) processed, {failed} failed"
        )),
    }
}
