use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Only commands that read or write report history need this.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub tracking_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Characters of context captured on each side of a brand mention.
    pub mention_context_chars: usize,
    pub crawl_navigation_timeout_secs: u64,
    pub crawl_response_timeout_secs: u64,
    pub crawl_inter_prompt_delay_ms: u64,
    pub crawl_settle_ms: u64,
    pub crawl_headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub crawl_profile_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("tracking_path", &self.tracking_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("mention_context_chars", &self.mention_context_chars)
            .field(
                "crawl_navigation_timeout_secs",
                &self.crawl_navigation_timeout_secs,
            )
            .field(
                "crawl_response_timeout_secs",
                &self.crawl_response_timeout_secs,
            )
            .field(
                "crawl_inter_prompt_delay_ms",
                &self.crawl_inter_prompt_delay_ms,
            )
            .field("crawl_settle_ms", &self.crawl_settle_ms)
            .field("crawl_headless", &self.crawl_headless)
            .field("chrome_path", &self.chrome_path)
            .field("crawl_profile_dir", &self.crawl_profile_dir)
            .finish()
    }
}
