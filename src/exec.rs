use crate::ParsedRequest;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of sending a [`ParsedRequest`], timed in milliseconds since the Unix epoch.
///
/// A transport failure (connection refused, timeout, invalid header, ...) is not an error here:
/// it is reported with `http_status == 0` and an `{ "error": true, "message": ... }` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub http_status: u16,
    pub duration: u64,
    pub request_start_timestamp: u64,
    pub request_stop_timestamp: u64,
    pub response_data: Value,
}

pub async fn execute(client: &reqwest::Client, req: &ParsedRequest) -> Execution {
    let start = epoch_millis();
    let outcome = send(client, req).await;
    let stop = epoch_millis();

    let (http_status, response_data) = match outcome {
        Ok(v) => v,
        Err(e) => {
            warn!("{} {} failed: {e}", req.method, req.full_url);
            (0, json!({ "error": true, "message": e.to_string() }))
        }
    };
    debug!(
        "{} {} -> {http_status} in {}ms",
        req.method,
        req.full_url,
        stop.saturating_sub(start)
    );

    Execution {
        http_status,
        duration: stop.saturating_sub(start),
        request_start_timestamp: start,
        request_stop_timestamp: stop,
        response_data,
    }
}

async fn send(client: &reqwest::Client, req: &ParsedRequest) -> Result<(u16, Value), reqwest::Error> {
    let res = req.request_builder(client).send().await?;
    let status = res.status().as_u16();
    let text = res.text().await?;
    Ok((status, response_data(text)))
}

/// JSON when the body parses as JSON, the raw text otherwise.
fn response_data(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
