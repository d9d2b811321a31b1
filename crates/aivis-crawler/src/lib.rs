//! Browser-driven crawl of AI chat interfaces.
//!
//! A [`CrawlController`] walks one [`ChatDriver`] through a fixed prompt list,
//! pausing for the operator when the site needs a login, and feeds every
//! response through the mention matcher.

pub mod browser;
pub mod checkpoint;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod events;
pub mod sites;

pub use browser::BrowserSession;
pub use checkpoint::{checkpoint_channel, CheckpointHandle, CheckpointListener, OperatorSignal};
pub use config::CrawlConfig;
pub use controller::{CrawlController, CrawlRun, PromptFailure};
pub use driver::ChatDriver;
pub use error::CrawlError;
pub use events::{CrawlEvent, CrawlState};
pub use sites::{BrowserChatDriver, CheckpointPolicy, Completion, SiteProfile};
