use crate::error::{AppError, Result};
use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};
use std::time::Duration;

lazy_static! {
    /// Visibility and ownership decisions by operation and outcome.
    pub static ref POLICY_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_policy_decisions_total",
        "Policy decisions segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register blog_policy_decisions_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_http_request_duration_seconds",
        "HTTP request latency segmented by method and status",
        &["method", "status"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("failed to register blog_http_request_duration_seconds");
}

/// Label for how a service operation ended.
pub fn outcome_label<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "allowed",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::Redirect(_)) => "redirected",
        Err(AppError::Forbidden(_)) => "forbidden",
        Err(AppError::Unauthorized(_)) => "unauthorized",
        Err(AppError::ValidationError(_)) => "invalid",
        Err(AppError::Conflict(_)) => "conflict",
        Err(AppError::DatabaseError(_)) | Err(AppError::Internal(_)) => "error",
    }
}

/// Count the outcome of `operation` and hand the result back.
pub fn record_outcome<T>(operation: &str, result: Result<T>) -> Result<T> {
    POLICY_DECISIONS_TOTAL
        .with_label_values(&[operation, outcome_label(&result)])
        .inc();
    result
}

pub fn observe_request(method: &str, status: u16, elapsed: Duration) {
    let status = status.to_string();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, status.as_str()])
        .observe(elapsed.as_secs_f64());
}
