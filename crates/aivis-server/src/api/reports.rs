use aivis_analysis::{
    aggregate, analyze_pairs, csv_file_name, mention_details, render_csv, MatchOptions,
    MentionDetail,
};
use aivis_core::{BrandCount, BrandSet, Report, ResponsePair};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ReportsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateReportBody {
    category: String,
    brands: Vec<String>,
    #[serde(default)]
    results: Vec<ResponsePair>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReportSummary {
    report_id: Uuid,
    category: String,
    brand_count: usize,
    prompt_count: usize,
    visibility_score: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReportDetail {
    report: Report,
    leaderboard: Vec<BrandCount>,
    total_mentions: usize,
    prompts_with_mentions: usize,
    mentions: Vec<MentionDetail>,
}

impl ReportDetail {
    fn new(report: Report) -> Self {
        let agg = aggregate(&report.results, &report.brands);
        Self {
            leaderboard: agg.leaderboard(),
            total_mentions: agg.total_mentions(),
            prompts_with_mentions: agg.prompts_with_mentions(),
            mentions: mention_details(&report),
            report,
        }
    }
}

fn validation_error(request_id: String, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

fn parse_report_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        validation_error(
            request_id.to_string(),
            format!("report id must be a UUID, got {raw:?}"),
        )
    })
}

async fn load_report(state: &AppState, request_id: &str, id: Uuid) -> Result<Report, ApiError> {
    let row = aivis_db::get_report(&state.pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_string(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                request_id.to_string(),
                "not_found",
                format!("report {id} not found"),
            )
        })?;

    row.into_report()
        .map_err(|e| map_db_error(request_id.to_string(), &e))
}

pub(super) async fn create_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<CreateReportBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReportDetail>>), ApiError> {
    let Json(body) = payload.map_err(|e| validation_error(req_id.0.clone(), e.body_text()))?;

    let brands = BrandSet::from_names(body.brands)
        .map_err(|e| validation_error(req_id.0.clone(), e.to_string()))?;
    let options = MatchOptions {
        context_chars: state.context_chars,
    };
    let report = analyze_pairs(&body.category, brands, &body.results, Utc::now(), options)
        .map_err(|e| validation_error(req_id.0.clone(), e.to_string()))?;

    aivis_db::insert_report(&state.pool, &report, None)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(
        request_id = %req_id.0,
        report_id = %report.id,
        prompts = report.results.len(),
        "report created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ReportDetail::new(report),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn list_reports(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReportsQuery>,
) -> Result<Json<ApiResponse<Vec<ReportSummary>>>, ApiError> {
    let rows = aivis_db::list_reports(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| ReportSummary {
            report_id: row.public_id,
            category: row.category,
            brand_count: row.brands.as_array().map_or(0, Vec::len),
            prompt_count: row.results.as_array().map_or(0, Vec::len),
            visibility_score: row.visibility_score,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReportDetail>>, ApiError> {
    let id = parse_report_id(&req_id.0, &id)?;
    let report = load_report(&state, &req_id.0, id).await?;

    Ok(Json(ApiResponse {
        data: ReportDetail::new(report),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_report_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_report_id(&req_id.0, &id)?;
    let report = load_report(&state, &req_id.0, id).await?;

    Ok(csv_response(&report))
}

fn csv_response(report: &Report) -> Response {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        csv_file_name(report)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"report.csv\""));

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_csv(report),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aivis_core::{BrandName, Mention, PromptResult};
    use chrono::TimeZone;

    fn report(category: &str) -> Report {
        Report {
            id: Uuid::new_v4(),
            category: category.to_string(),
            brands: BrandSet::from_names(["Salesforce", "HubSpot"]).unwrap(),
            results: vec![
                PromptResult {
                    prompt: "best crm?".to_string(),
                    response_text: "HubSpot and HubSpot".to_string(),
                    mentions: vec![
                        Mention {
                            brand: BrandName::new("HubSpot").unwrap(),
                            position: 0,
                            context: "HubSpot and HubSpot".to_string(),
                        },
                        Mention {
                            brand: BrandName::new("HubSpot").unwrap(),
                            position: 12,
                            context: "HubSpot and HubSpot".to_string(),
                        },
                    ],
                },
                PromptResult::failed("slow prompt"),
            ],
            visibility_score: 50.0,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn report_detail_carries_leaderboard() {
        let detail = ReportDetail::new(report("CRM software"));
        assert_eq!(detail.total_mentions, 2);
        assert_eq!(detail.prompts_with_mentions, 1);
        assert_eq!(detail.leaderboard[0].brand.as_str(), "HubSpot");
        assert_eq!(detail.leaderboard[0].visibility_percent, 100);

        let json = serde_json::to_value(&detail).expect("serialize report detail");
        assert_eq!(json["report"]["category"], "CRM software");
        assert_eq!(json["report"]["visibilityScore"], 50.0);
        assert_eq!(json["leaderboard"][1]["mentions"], 0);
        assert_eq!(json["mentions"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["mentions"][0]["prompt"], "best crm?");
        assert_eq!(json["mentions"][0]["brand"], "HubSpot");
    }

    #[test]
    fn create_body_accepts_camel_case_pairs() {
        let body: CreateReportBody = serde_json::from_value(serde_json::json!({
            "category": "CRM",
            "brands": ["HubSpot"],
            "results": [{"prompt": "p", "responseText": "HubSpot"}]
        }))
        .unwrap();
        assert_eq!(body.results[0].response_text, "HubSpot");
    }

    #[test]
    fn parse_report_id_rejects_garbage() {
        assert!(parse_report_id("req", "nope").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_report_id("req", &id.to_string()).unwrap(), id);
    }

    #[test]
    fn csv_response_sets_download_headers() {
        let response = csv_response(&report("CRM software"));
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report-CRM-software.csv\""
        );
    }

    #[test]
    fn csv_response_falls_back_when_filename_is_not_a_header_value() {
        let response = csv_response(&report("bad\u{7f}name"));
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.csv\""
        );
    }
}
