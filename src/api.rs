//! HTTP API for the Pajak Engine.
//!
//! This module exposes the engine over a small REST API built on
//! [`axum`](https://crates.io/crates/axum).  Clients submit a tagged
//! tax input and receive the total together with its breakdown in
//! JSON.  A handful of lookup routes give direct access to the rate
//! tables and the money parser.  All amounts travel as raw scaled
//! integers (`1` rupiah is `10000`).

use crate::config::ServerConfig;
use crate::engine::{self, VERSION};
use crate::error::TaxError;
use crate::models::{PtkpStatus, TaxInput, TerCategory};
use crate::money::Money;
use crate::rates::{self, LayerTax};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

/// Build the API router.  The engine is stateless, so the router
/// carries no shared state.
pub fn build_router() -> Router {
    Router::new()
        .route("/api/calculate", post(calculate_handler))
        .route("/api/money/parse", post(parse_money_handler))
        .route("/api/version", get(version_handler))
        .route("/api/ptkp/:code", get(ptkp_handler))
        .route("/api/ter/:category/:gross", get(ter_handler))
        .route("/api/pasal17/:pkp", get(pasal17_handler))
}

/// A [`TaxError`] answered with its HTTP status and a `{error, code}` body.
struct ApiError(TaxError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({ "error": self.0.to_string(), "code": self.0.code() }));
        (status, body).into_response()
    }
}

/// Handler for POST /api/calculate.  A `null` body is a missing input; a
/// body that is not a tax input is an invalid one.
async fn calculate_handler(payload: Result<Json<Option<TaxInput>>, JsonRejection>) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "calculation body rejected");
            return ApiError(TaxError::InvalidInput(rejection.body_text())).into_response();
        }
    };
    match engine::compute(input.as_ref()) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ParseRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct ParseResponse {
    /// Lenient result: zero when the text is malformed.
    raw: Money,
    formatted: String,
    /// Why the strict parser rejected the text, if it did.
    error: Option<String>,
}

/// Handler for POST /api/money/parse
async fn parse_money_handler(Json(request): Json<ParseRequest>) -> Json<ParseResponse> {
    let raw = Money::parse_id(&request.text);
    let error = request.text.parse::<Money>().err().map(|err| err.to_string());
    Json(ParseResponse {
        raw,
        formatted: raw.to_id_string(),
        error,
    })
}

async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({ "version": VERSION }))
}

/// Handler for GET /api/ptkp/:code.  Unknown codes fall back to TK/0.
async fn ptkp_handler(Path(code): Path<i64>) -> Json<serde_json::Value> {
    let status = PtkpStatus::from_code(code);
    Json(json!({ "status": status, "ptkp": rates::ptkp(status) }))
}

/// Handler for GET /api/ter/:category/:gross.  `gross` is a raw scaled
/// value; unknown categories fall back to A.
async fn ter_handler(Path((category, gross)): Path<(i64, i64)>) -> Json<serde_json::Value> {
    let category = TerCategory::from_code(category);
    let gross = Money::from_raw(gross);
    Json(json!({
        "category": category,
        "monthly_rate": rates::ter_monthly_rate(category, gross),
        "daily_rate": rates::ter_daily_rate(category, gross),
    }))
}

#[derive(Debug, Serialize)]
struct Pasal17Response {
    pkp: Money,
    tax: Money,
    layers: Vec<LayerTax>,
}

/// Handler for GET /api/pasal17/:pkp
async fn pasal17_handler(Path(pkp): Path<i64>) -> Json<Pasal17Response> {
    let pkp = Money::from_raw(pkp);
    Json(Pasal17Response {
        pkp,
        tax: rates::pasal17(pkp),
        layers: rates::pasal17_layers(pkp),
    })
}

/// Launch the API server on the configured address.  Blocks until the
/// server terminates.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, version = VERSION, "server listening");
    axum::serve(listener, build_router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_text(uri: &str, body: &'static str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn calculate_ppn() {
        let body = json!({ "tax": "ppn", "dpp": 1_000_000, "rate": 1_100 });
        let (status, value) = send(post_json("/api/calculate", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["total_tax"], 110_000);
        assert_eq!(value["breakdown"][0]["label"], "PPN");
        assert_eq!(value["breakdown"][0]["variant"], "section");
        assert_eq!(value["breakdown"][3]["variant"], "total");
    }

    #[tokio::test]
    async fn calculate_pph21_with_bonus() {
        let body = json!({
            "tax": "pph21",
            "subject_type": "pegawai_tetap",
            "bruto_monthly": 100_000_000_000i64,
            "months_paid": 12,
            "pension_contribution": 1_000_000_000,
            "ptkp_status": "TK/0",
            "scheme": "ter",
            "ter_category": "A",
            "bonuses": [{ "month": 4, "amount": 100_000_000_000i64, "name": "THR" }]
        });
        let (status, value) = send(post_json("/api/calculate", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["total_tax"], 43_200_000_000i64);
    }

    #[tokio::test]
    async fn null_body_is_missing_input() {
        let (status, value) = send(post_json("/api/calculate", Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "MISSING_INPUT");
        assert_eq!(value["error"], "input is missing");
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let body = json!({
            "tax": "pph21",
            "subject_type": "pegawai_tetap",
            "bruto_monthly": 10_000,
            "months_paid": 13,
            "ptkp_status": "K/1",
            "scheme": "pasal17",
            "ter_category": "B"
        });
        let (status, value) = send(post_json("/api/calculate", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn malformed_body_answers_with_error_json() {
        let (status, value) = send(post_text("/api/calculate", "{\"tax\": ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "INVALID_INPUT");
        assert!(value["error"].as_str().is_some_and(|e| e.starts_with("invalid input")));

        let body = json!({ "tax": "pph99", "dpp": 1 });
        let (status, value) = send(post_json("/api/calculate", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn parse_money_reports_strict_errors() {
        let (status, value) = send(post_json("/api/money/parse", json!({ "text": "1.234,5" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["raw"], 12_345_000);
        assert_eq!(value["formatted"], "1.234,5000");
        assert!(value["error"].is_null());

        let (_, value) = send(post_json("/api/money/parse", json!({ "text": "12a" }))).await;
        assert_eq!(value["raw"], 0);
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn version_route() {
        let (status, value) = send(get("/api/version")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["version"], VERSION);
    }

    #[tokio::test]
    async fn ptkp_lookup_falls_back_to_tk0() {
        let (_, value) = send(get("/api/ptkp/4")).await;
        assert_eq!(value["status"], "K/0");
        assert_eq!(value["ptkp"], 585_000_000_000i64);

        let (_, value) = send(get("/api/ptkp/99")).await;
        assert_eq!(value["status"], "TK/0");
        assert_eq!(value["ptkp"], 540_000_000_000i64);
    }

    #[tokio::test]
    async fn ter_lookup() {
        let (_, value) = send(get("/api/ter/0/100000000000")).await;
        assert_eq!(value["category"], "A");
        assert_eq!(value["monthly_rate"], 200);
        assert_eq!(value["daily_rate"], 200);
    }

    #[tokio::test]
    async fn pasal17_lookup_lists_layers() {
        let (_, value) = send(get("/api/pasal17/3000000000000")).await;
        assert_eq!(value["tax"], 440_000_000_000i64);
        assert_eq!(value["layers"].as_array().map(Vec::len), Some(3));
    }
}
