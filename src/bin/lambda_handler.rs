//! AWS Lambda handler for scenario evaluation
//!
//! Accepts a list of field edits as JSON, applies them to a fresh baseline
//! scenario and returns the derived metrics in native and display units.
//!
//! Works with direct invocation (the payload is the request) and with Lambda
//! Function URLs (the request is the JSON in `body`, base64 encoded or not).
//! Set BASELINE_PATH to load an override baseline CSV at cold start.

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use profit_levers::{
    required_external_sales, BaselineConstants, BreakEven, DerivedMetrics, DisplayMetrics,
    FieldValue, ScenarioRunner, ScenarioState,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Input for one evaluation
#[derive(Debug, Default, Deserialize)]
pub struct ScenarioRequest {
    /// Edits applied in order to the baseline scenario
    #[serde(default)]
    pub edits: Vec<FieldValue>,

    /// Money edits are in the display unit selected by the edits
    #[serde(default)]
    pub display_input: bool,

    /// Monthly operating profit target, in display units
    #[serde(default)]
    pub target_operating_profit: Option<f64>,
}

/// Output from one evaluation
#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub baseline: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<DerivedMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_external_sales: Option<BreakEven>,
    pub execution_time_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioResponse {
    fn failed(runner: &ScenarioRunner, message: String, start: Instant) -> Self {
        log::warn!("Scenario request failed: {}", message);
        let baseline = runner.baseline();
        Self {
            baseline: baseline.label.clone(),
            unit: baseline.unit_label(baseline.currency).to_string(),
            scenario: None,
            metrics: None,
            display: None,
            target_external_sales: None,
            execution_time_us: start.elapsed().as_micros() as u64,
            error: Some(message),
        }
    }
}

/// Function URL events carry the HTTP envelope; anything else is a direct payload
fn is_http_event(payload: &Value) -> bool {
    ["requestContext", "body", "isBase64Encoded"]
        .iter()
        .any(|key| payload.get(*key).is_some())
}

/// Decode the body of a Function URL event into the request
fn parse_http_event(event: LambdaFunctionUrlRequest) -> Result<ScenarioRequest, String> {
    let body = match event.body {
        Some(body) if !body.trim().is_empty() => body,
        _ => return Ok(ScenarioRequest::default()),
    };

    let bytes = if event.is_base64_encoded {
        STANDARD
            .decode(body.trim())
            .map_err(|e| format!("Invalid base64 body: {}", e))?
    } else {
        body.into_bytes()
    };

    serde_json::from_slice(&bytes).map_err(|e| format!("Invalid JSON: {}", e))
}

/// Pull the request out of a direct payload or a Function URL event
fn parse_request(payload: Value) -> Result<ScenarioRequest, String> {
    if is_http_event(&payload) {
        let event: LambdaFunctionUrlRequest = serde_json::from_value(payload)
            .map_err(|e| format!("Invalid Function URL event: {}", e))?;
        return parse_http_event(event);
    }
    serde_json::from_value(payload).map_err(|e| format!("Invalid JSON: {}", e))
}

/// Evaluate one request against the shared baseline
fn evaluate(runner: &ScenarioRunner, request: &ScenarioRequest) -> ScenarioResponse {
    let start = Instant::now();

    let mut session = runner.session();
    if let Err(e) = session.apply(&request.edits, request.display_input) {
        return ScenarioResponse::failed(runner, e.to_string(), start);
    }

    let scenario = session.get_scenario();
    let metrics = session.metrics();
    let display = match DisplayMetrics::from_metrics(&metrics, &scenario) {
        Ok(d) => d,
        Err(e) => return ScenarioResponse::failed(runner, e.to_string(), start),
    };

    let target_external_sales = match request.target_operating_profit {
        Some(target) => {
            let converted = scenario.to_native(target).and_then(|native| {
                required_external_sales(&scenario, native)
                    .to_display(scenario.currency, scenario.exchange_rate)
            });
            match converted {
                Ok(sales) => Some(sales),
                Err(e) => return ScenarioResponse::failed(runner, e.to_string(), start),
            }
        }
        None => None,
    };

    ScenarioResponse {
        baseline: runner.baseline().label.clone(),
        unit: runner.baseline().unit_label(scenario.currency).to_string(),
        scenario: Some(scenario),
        metrics: Some(metrics),
        display: Some(display),
        target_external_sales,
        execution_time_us: start.elapsed().as_micros() as u64,
        error: None,
    }
}

async fn handler(runner: &ScenarioRunner, event: LambdaEvent<Value>) -> Result<ScenarioResponse, Error> {
    let start = Instant::now();
    let response = match parse_request(event.payload) {
        Ok(request) => evaluate(runner, &request),
        Err(message) => ScenarioResponse::failed(runner, message, start),
    };
    Ok(response)
}

fn load_runner() -> Result<ScenarioRunner, Error> {
    let baseline = match env::var("BASELINE_PATH") {
        Ok(path) => BaselineConstants::from_csv_path(Path::new(&path))?,
        Err(_) => BaselineConstants::fy2025(),
    };
    Ok(ScenarioRunner::with_baseline(Arc::new(baseline)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let runner = load_runner()?;
    run(service_fn(move |event: LambdaEvent<Value>| {
        let runner = runner.clone();
        async move { handler(&runner, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_payload() {
        let runner = ScenarioRunner::new();
        let request = parse_request(json!({
            "edits": [
                {"field": "repairs_m", "value": 700.0},
                {"field": "efficiency", "value": 0.6}
            ]
        }))
        .unwrap();

        let response = evaluate(&runner, &request);
        assert!(response.error.is_none());

        let scenario = response.scenario.unwrap();
        assert_eq!(scenario.repairs_m, 700.0);
        assert_eq!(scenario.efficiency, 0.6);
        assert!(response.metrics.unwrap().operating_profit < 0.0);
    }

    /// Function URL event as delivered by Lambda
    fn url_event(body: &str, is_base64_encoded: bool) -> Value {
        json!({
            "version": "2.0",
            "rawPath": "/",
            "rawQueryString": "",
            "headers": {"content-type": "application/json"},
            "requestContext": {
                "accountId": "123456789012",
                "apiId": "abcdefghij",
                "domainName": "abcdefghij.lambda-url.ap-southeast-2.on.aws",
                "domainPrefix": "abcdefghij",
                "http": {
                    "method": "POST",
                    "path": "/",
                    "protocol": "HTTP/1.1",
                    "sourceIp": "203.0.113.10",
                    "userAgent": "curl/8.4.0"
                },
                "requestId": "c2a1d7e0-5b3e-4f7a-9d8e-0e4a1c6b2f11",
                "routeKey": "$default",
                "stage": "$default",
                "time": "15/Oct/2026:09:30:00 +0000",
                "timeEpoch": 1792056600000i64
            },
            "body": body,
            "isBase64Encoded": is_base64_encoded
        })
    }

    #[test]
    fn test_function_url_body() {
        let body = r#"{"edits": [{"field": "currency", "value": "foreign"}], "target_operating_profit": 0.0}"#;
        let request = parse_request(url_event(body, false)).unwrap();
        let response = evaluate(&ScenarioRunner::new(), &request);

        assert_eq!(response.unit, "THB'000");
        let display = response.display.unwrap();
        let metrics = response.metrics.unwrap();
        assert!((display.total_gp - metrics.total_gp * 24.0).abs() < 1e-9);

        let target = response.target_external_sales.unwrap().value().unwrap();
        assert!((target - metrics.break_even.as_f64() * 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_function_url_base64_body() {
        let encoded = STANDARD.encode(r#"{"edits":[{"field":"repairs_m","value":700.0}]}"#);
        assert_eq!(
            encoded,
            "eyJlZGl0cyI6W3siZmllbGQiOiJyZXBhaXJzX20iLCJ2YWx1ZSI6NzAwLjB9XX0="
        );

        let request = parse_request(url_event(&encoded, true)).unwrap();
        let response = evaluate(&ScenarioRunner::new(), &request);

        assert!(response.error.is_none());
        assert_eq!(response.scenario.unwrap().repairs_m, 700.0);
    }

    #[test]
    fn test_function_url_bad_base64() {
        let err = parse_request(url_event("not base64!", true)).unwrap_err();
        assert!(err.starts_with("Invalid base64 body"));
    }

    #[test]
    fn test_body_without_envelope_is_rejected() {
        let err = parse_request(json!({
            "body": "eyJlZGl0cyI6W119",
            "isBase64Encoded": true
        }))
        .unwrap_err();
        assert!(err.starts_with("Invalid Function URL event"));
    }

    #[test]
    fn test_empty_body_uses_baseline() {
        let request = parse_request(url_event("", false)).unwrap();
        let response = evaluate(&ScenarioRunner::new(), &request);
        assert_eq!(response.scenario.unwrap().external_sales_m, 721.5);
    }

    #[test]
    fn test_rejected_edit_returns_error() {
        let request = parse_request(json!({
            "edits": [{"field": "ext_cost_pct", "value": 1.5}]
        }))
        .unwrap();
        let response = evaluate(&ScenarioRunner::new(), &request);

        assert!(response.metrics.is_none());
        assert!(response.error.unwrap().contains("ext_cost_pct"));
    }

    #[test]
    fn test_unknown_field_is_invalid_json() {
        let err = parse_request(json!({
            "edits": [{"field": "external_margin_pct", "value": 17}]
        }))
        .unwrap_err();
        assert!(err.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_unreachable_break_even_serializes() {
        let request = parse_request(json!({
            "edits": [{"field": "ext_cost_pct", "value": 1.0}]
        }))
        .unwrap();
        let response = evaluate(&ScenarioRunner::new(), &request);
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["metrics"]["break_even"]["kind"], "unreachable");
    }
}
