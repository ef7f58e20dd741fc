use std::collections::BTreeMap;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use monitor_app::{
    RangeParams, ResolvedRange, render_html, render_json, resolve_range, today_local,
};
use monitor_core::{UsageDate, UsageRow, Usd};
use serde::Serialize;

use crate::{errors::HttpError, state::HttpState};

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub label: String,
    pub start_date: UsageDate,
    pub end_date: UsageDate,
    pub rows: Vec<UsageRow>,
}

#[derive(Debug, Serialize)]
pub struct TotalCostResponse {
    pub label: String,
    pub start_date: UsageDate,
    pub end_date: UsageDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub total_cost: Usd,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct CostMapResponse {
    pub label: String,
    pub start_date: UsageDate,
    pub end_date: UsageDate,
    pub costs: BTreeMap<String, Usd>,
}

fn resolve(params: &RangeParams) -> Result<ResolvedRange, HttpError> {
    Ok(resolve_range(params, today_local())?)
}

pub async fn usage(
    State(state): State<HttpState>,
    Json(params): Json<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    let resolved = resolve(&params)?;
    let rows = state
        .app
        .services
        .reports
        .usage(&resolved.range, params.provider.as_deref())?;
    Ok(Json(UsageResponse {
        label: resolved.label,
        start_date: resolved.range.start().clone(),
        end_date: resolved.range.end().clone(),
        rows,
    }))
}

pub async fn total_cost(
    State(state): State<HttpState>,
    Json(params): Json<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    let resolved = resolve(&params)?;
    let total = state
        .app
        .services
        .reports
        .total_cost(&resolved.range, params.provider.as_deref())?;
    Ok(Json(TotalCostResponse {
        label: resolved.label,
        start_date: resolved.range.start().clone(),
        end_date: resolved.range.end().clone(),
        provider: params.provider,
        total_cost: total,
        formatted: total.to_string(),
    }))
}

pub async fn cost_by_model(
    State(state): State<HttpState>,
    Json(params): Json<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    let resolved = resolve(&params)?;
    let costs = state
        .app
        .services
        .reports
        .cost_by_model(&resolved.range, params.provider.as_deref())?;
    Ok(Json(CostMapResponse {
        label: resolved.label,
        start_date: resolved.range.start().clone(),
        end_date: resolved.range.end().clone(),
        costs,
    }))
}

pub async fn cost_by_provider(
    State(state): State<HttpState>,
    Json(params): Json<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    let resolved = resolve(&params)?;
    let costs = state
        .app
        .services
        .reports
        .cost_by_provider(&resolved.range)?;
    Ok(Json(CostMapResponse {
        label: resolved.label,
        start_date: resolved.range.start().clone(),
        end_date: resolved.range.end().clone(),
        costs,
    }))
}

pub async fn report(
    State(state): State<HttpState>,
    Json(params): Json<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    let report = state.app.services.reports.report(&params, today_local())?;
    Ok(Json(render_json(&report)))
}

pub async fn report_page(
    State(state): State<HttpState>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    let report = state.app.services.reports.report(&params, today_local())?;
    Ok(Html(render_html(&report)))
}

pub async fn not_found() -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        "not found",
        Some("not_found".to_string()),
    )
}
