use reqwest::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use yansi::Paint;

use super::error::ApiError;

static SILENT: AtomicBool = AtomicBool::new(false);

const MAX_ERROR_BODY: usize = 512;

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// Render a request as the equivalent curl command line.
pub fn curl_line(method: &Method, url: &str, body: Option<&Value>) -> String {
    let mut parts = Vec::new();
    parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
    parts.push(format!("-X {}", Paint::new(method.as_str()).fg(yansi::Color::Yellow).bold()));
    parts.push(format!("'{}'", Paint::new(url).fg(yansi::Color::Cyan)));
    if let Some(d) = body {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
        ));
        let json_str = serde_json::to_string_pretty(d).unwrap_or_default();
        let escaped_json = json_str.replace('\'', "'\\''");
        parts.push(format!(
            "{} {}",
            Paint::new("-d").fg(yansi::Color::Blue),
            Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
        ));
    }
    parts.join(" ")
}

/// Core HTTP call against the backend.
/// Non-2xx statuses become [`ApiError::Status`]; an empty success body is `Value::Null`.
pub async fn api_call(
    client: &reqwest::Client,
    api_base_url: &str,
    method: Method,
    endpoint: &str,
    body: Option<&Value>,
) -> Result<Value, ApiError> {
    if api_base_url.trim().is_empty() {
        return Err(ApiError::InvalidBaseUrl("API_BASE_URL is empty".into()));
    }
    let url = format!("{}{}", api_base_url, endpoint);
    log_output(format!("Request:\n{}", curl_line(&method, &url, body)));
    tracing::info!(method = %method, endpoint, "API request");

    let mut req = client.request(method.clone(), &url);
    if let Some(b) = body {
        req = req.json(b);
    }

    let resp = req.send().await.map_err(|e| {
        tracing::error!(%e, method = %method, endpoint, "API request failed");
        ApiError::from(e)
    })?;
    let status = resp.status();
    let text = resp.text().await?;

    // Grayed out so the request line stays the focus.
    log_output(format!(
        "Response ({}):\n{}",
        status.as_u16(),
        Paint::new(&text).rgb(100, 100, 100)
    ));

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), endpoint, "API returned an error status");
        let mut body = text;
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
