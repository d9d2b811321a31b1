//! Offline tests for pool configuration and row decoding. No database needed.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use aivis_core::{AppConfig, BrandName, BrandSet, Environment, Mention, PromptResult};
use aivis_db::{DbError, PoolConfig, ReportRow};
use chrono::{TimeZone, Utc};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: None,
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        tracking_path: PathBuf::from("./config/tracking.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        mention_context_chars: 40,
        crawl_navigation_timeout_secs: 60,
        crawl_response_timeout_secs: 60,
        crawl_inter_prompt_delay_ms: 2000,
        crawl_settle_ms: 1500,
        crawl_headless: false,
        chrome_path: None,
        crawl_profile_dir: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_without_database_url_is_missing_url() {
    let err = aivis_db::connect_from_app_config(&app_config())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::MissingDatabaseUrl));
}

fn row(brands: serde_json::Value, results: serde_json::Value) -> ReportRow {
    ReportRow {
        id: 1,
        public_id: Uuid::new_v4(),
        category: "CRM software".to_string(),
        brands,
        results,
        visibility_score: 50.0,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        crawl_run_id: None,
    }
}

#[test]
fn report_row_decodes_stored_json() {
    let brands = BrandSet::from_names(["Salesforce", "HubSpot"]).unwrap();
    let results = vec![
        PromptResult {
            prompt: "best crm?".to_string(),
            response_text: "HubSpot".to_string(),
            mentions: vec![Mention {
                brand: BrandName::new("HubSpot").unwrap(),
                position: 0,
                context: "HubSpot".to_string(),
            }],
        },
        PromptResult::failed("slow prompt"),
    ];
    let row = row(
        serde_json::to_value(&brands).unwrap(),
        serde_json::to_value(&results).unwrap(),
    );
    let public_id = row.public_id;

    let report = row.into_report().unwrap();
    assert_eq!(report.id, public_id);
    assert_eq!(report.brands, brands);
    assert_eq!(report.results, results);
    assert!((report.visibility_score - 50.0).abs() < f64::EPSILON);
}

#[test]
fn report_row_with_bad_results_is_malformed() {
    let row = row(
        serde_json::json!(["Salesforce"]),
        serde_json::json!({"not": "a list"}),
    );
    let err = row.into_report().unwrap_err();
    match err {
        DbError::MalformedReport { reason, .. } => assert!(reason.starts_with("results:")),
        other => panic!("expected MalformedReport, got {other:?}"),
    }
}

#[test]
fn report_row_with_blank_brand_is_malformed() {
    let row = row(serde_json::json!(["  "]), serde_json::json!([]));
    assert!(matches!(
        row.into_report(),
        Err(DbError::MalformedReport { .. })
    ));
}
