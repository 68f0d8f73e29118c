use crate::types::DocumentInference;
use reqwest::blocking::{multipart, Client};
use serde_json::Value;
use std::fs;
use std::path::Path;

const PREDICT_URL: &str =
    "https://api.mindee.net/v1/products/mindee/financial_document/v1/predict";

fn load_env() {
    let _ = dotenvy::dotenv();
}

/// "configured" when the API key is present and non-empty.
pub fn api_status() -> String {
    load_env();
    match std::env::var("MINDEE_API_KEY") {
        Ok(k) if !k.trim().is_empty() => "configured".to_string(),
        _ => "not_configured".to_string(),
    }
}

/// Upload one document to the prediction endpoint and unwrap the inference.
/// One request per user-initiated upload; no retries - a failure surfaces as
/// the returned message and the UI stays on the upload prompt.
pub fn run_predict(file_path: &str) -> Result<DocumentInference, String> {
    load_env();
    let key = std::env::var("MINDEE_API_KEY").map_err(|_| "MINDEE_API_KEY not set in .env")?;

    let path = Path::new(file_path);
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            "File not found.".to_string()
        } else {
            format!("Could not read file: {}", e)
        }
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .map_err(|e| e.to_string())?;

    let form = multipart::Form::new().part("document", multipart::Part::bytes(bytes).file_name(file_name));
    let response = client
        .post(PREDICT_URL)
        .header("Authorization", format!("Token {}", key))
        .multipart(form)
        .send()
        .map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                "Check your internet connection and try again."
            } else {
                "Network error."
            }
            .to_string()
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(format!(
            "Prediction failed ({}): {}",
            status,
            if body.is_empty() {
                "Invalid API key?"
            } else {
                body.as_str()
            }
        ));
    }

    let body: Value = response
        .json()
        .map_err(|e| format!("Invalid JSON: {}", e))?;
    parse_inference(&body)
}

/// Unwrap `document.inference` from the API response body: the raw
/// prediction map plus the first page's orientation (0 when absent).
pub fn parse_inference(body: &Value) -> Result<DocumentInference, String> {
    let inference = body
        .get("document")
        .and_then(|d| d.get("inference"))
        .ok_or("No inference in response")?;
    let prediction = inference
        .get("prediction")
        .cloned()
        .ok_or("No prediction in response")?;
    if !prediction.is_object() {
        return Err("Prediction is not a JSON object".to_string());
    }
    let orientation = inference
        .get("pages")
        .and_then(|p| p.as_array())
        .and_then(|p| p.first())
        .and_then(|p| p.get("orientation"))
        .and_then(|o| o.get("value"))
        .and_then(Value::as_i64)
        .unwrap_or(0);

    #[cfg(debug_assertions)]
    {
        let field_count = prediction.as_object().map(|m| m.len()).unwrap_or(0);
        eprintln!(
            "[predict] inference: {} prediction field(s), orientation {}",
            field_count, orientation
        );
    }

    Ok(DocumentInference {
        prediction,
        orientation,
    })
}
