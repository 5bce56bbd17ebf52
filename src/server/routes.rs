use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::helpers::time::{get_instant, now_u32};
use crate::issuer::params::{parse_rtc_params, parse_rtm_params, ExpiryQuery, RtcPath, RtmPath};
use crate::issuer::{ErrorOutcome, IssueError, Stage, TokenKind};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::server::server::AppState;

static ROUTE_RTC: &str = "rtc";
static ROUTE_RTM: &str = "rtm";
static ROUTE_RTE: &str = "rte";

type PathParams<T> = Result<Path<T>, PathRejection>;
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtc_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtm_token: Option<String>,
}

/// Parse rejections go out under `message`, build rejections under `error`.
/// Existing clients depend on this split.
#[derive(Debug, Default, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ErrorOutcome> for ErrorBody {
    fn from(outcome: ErrorOutcome) -> Self {
        match outcome.stage {
            Stage::Parse => ErrorBody {
                message: Some(outcome.message),
                ..Default::default()
            },
            Stage::Build => ErrorBody {
                error: Some(outcome.message),
                ..Default::default()
            },
        }
    }
}

pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}

pub async fn get_rtc_token(
    State(state): State<AppState>,
    path: PathParams<RtcPath>,
    query: QueryPairs,
) -> Response {
    let metrics = get_metrics().await;
    let start = get_instant();

    let response = match extract(path, query)
        .and_then(|(path, query)| parse_rtc_params(path, &query, now_u32()))
        .and_then(|intent| state.dispatcher.build_rtc(&intent))
    {
        Ok(token) => issued(
            metrics,
            &[TokenKind::Rtc],
            TokenBody {
                rtc_token: Some(token),
                ..Default::default()
            },
        ),
        Err(e) => reject(metrics, TokenKind::Rtc, &e),
    };

    observe(metrics, ROUTE_RTC, start);
    response
}

pub async fn get_rtm_token(
    State(state): State<AppState>,
    path: PathParams<RtmPath>,
    query: QueryPairs,
) -> Response {
    let metrics = get_metrics().await;
    let start = get_instant();

    let response = match extract(path, query)
        .and_then(|(path, query)| parse_rtm_params(path, &query, now_u32()))
        .and_then(|intent| state.dispatcher.build_rtm(&intent))
    {
        Ok(token) => issued(
            metrics,
            &[TokenKind::Rtm],
            TokenBody {
                rtm_token: Some(token),
                ..Default::default()
            },
        ),
        Err(e) => reject(metrics, TokenKind::Rtm, &e),
    };

    observe(metrics, ROUTE_RTM, start);
    response
}

/// Both tokens share one parse and one expiry. Both builds always run;
/// the RTC failure is reported when both fail.
pub async fn get_both_tokens(
    State(state): State<AppState>,
    path: PathParams<RtcPath>,
    query: QueryPairs,
) -> Response {
    let metrics = get_metrics().await;
    let start = get_instant();

    let parsed = extract(path, query).and_then(|(path, query)| parse_rtc_params(path, &query, now_u32()));
    let response = match parsed {
        Err(e) => reject(metrics, TokenKind::Rtc, &e),
        Ok(intent) => {
            let rtc = state.dispatcher.build_rtc(&intent);
            let rtm = state.dispatcher.build_rtm(&intent.rtm_intent());
            match (rtc, rtm) {
                (Err(e), _) => reject(metrics, TokenKind::Rtc, &e),
                (Ok(_), Err(e)) => reject(metrics, TokenKind::Rtm, &e),
                (Ok(rtc_token), Ok(rtm_token)) => issued(
                    metrics,
                    &[TokenKind::Rtc, TokenKind::Rtm],
                    TokenBody {
                        rtc_token: Some(rtc_token),
                        rtm_token: Some(rtm_token),
                    },
                ),
            }
        }
    };

    observe(metrics, ROUTE_RTE, start);
    response
}

/// Extractor rejections surface as parse-stage errors.
fn extract<T>(path: PathParams<T>, query: QueryPairs) -> Result<(T, ExpiryQuery), IssueError> {
    let Path(path) = path.map_err(|e| IssueError::MalformedRequest(e.body_text()))?;
    let Query(pairs) = query.map_err(|e| IssueError::MalformedRequest(e.body_text()))?;
    Ok((path, ExpiryQuery::from_pairs(pairs)))
}

fn issued(metrics: &Metrics, kinds: &[TokenKind], body: TokenBody) -> Response {
    for kind in kinds {
        metrics.tokens_issued.with_label_values(&[kind.as_str()]).inc();
    }
    info!("issued {:?} token(s)", kinds);
    (StatusCode::OK, Json(body)).into_response()
}

fn reject(metrics: &Metrics, kind: TokenKind, err: &IssueError) -> Response {
    let outcome = ErrorOutcome::new(kind, err);
    metrics
        .token_failures
        .with_label_values(&[kind.as_str(), outcome.stage.as_str()])
        .inc();
    warn!("{} request rejected at {} stage: {}", kind.label(), outcome.stage.as_str(), outcome.message);
    (StatusCode::BAD_REQUEST, Json(ErrorBody::from(outcome))).into_response()
}

fn observe(metrics: &Metrics, route: &str, start: tokio::time::Instant) {
    metrics
        .request_duration
        .with_label_values(&[route])
        .observe(start.elapsed().as_secs_f64());
}
