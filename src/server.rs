//! HTTP front end: `POST /` with `{ "reqline": "<statement>" }`.
//!
//! Parse failures answer 400 with `{ "error": true, "message": ... }`. A statement that parses
//! is always executed and answers 200, even when the target itself fails; see [`Execution`].

use crate::{Execution, ParsedRequest, execute};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpListener;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Server settings, read from `HOST`, `PORT` and `REQLINE_TIMEOUT_SECS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Timeout for the outgoing request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(e) => warn!("ignoring PORT={port:?}: {e}"),
            }
        }
        if let Some(secs) = lookup("REQLINE_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(0) => warn!("ignoring REQLINE_TIMEOUT_SECS=0, requests run without timeout"),
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(e) => warn!("ignoring REQLINE_TIMEOUT_SECS={secs:?}: {e}"),
            }
        }
        config
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The client used for outgoing requests.
    pub fn client(&self) -> reqwest::Result<reqwest::Client> {
        let builder = reqwest::Client::builder();
        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        builder.build()
    }
}

#[derive(Clone)]
pub struct AppState {
    client: reqwest::Client,
}

impl AppState {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    request: ParsedRequest,
    response: Execution,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    message: String,
}

/// Everything answered with 400.
#[derive(Debug)]
enum ApiError {
    Payload(String),
    Parse(crate::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::Payload(message) => message,
            ApiError::Parse(e) => e.to_string(),
        };
        let body = ErrorBody {
            error: true,
            message,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new().route("/", post(handle)).with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("reqline server listening on {addr}");
    }
    axum::serve(listener, app(state)).await
}

async fn handle(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Payload(e.body_text()))?;
    let statement = payload
        .get("reqline")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Payload("reqline is required".to_owned()))?;

    let request: ParsedRequest = statement.parse().map_err(ApiError::Parse)?;
    debug!("executing {} {}", request.method, request.full_url);
    let response = execute(&state.client, &request).await;
    Ok(Json(Report { request, response }))
}
