use serde::{Deserialize, Serialize};

/// Ordered closed boundary of a field on the source image.
pub type Polygon = Vec<[f64; 2]>;

/// Display-ready field or line item derived from the raw prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Polygon>,
}

/// Unwrapped `document.inference` payload from the prediction API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInference {
    /// Raw field map as returned by the API. Structure is not under our
    /// control; fields may be absent or null.
    pub prediction: serde_json::Value,
    /// `pages[0].orientation.value`; 0 means portrait.
    #[serde(default)]
    pub orientation: i64,
}

/// Everything one successful upload produces, shipped to the webview in a
/// single payload and replaced wholesale on the next upload.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub prediction: serde_json::Value,
    pub orientation: i64,
    pub records: Vec<PredictionRecord>,
    /// Aggregate confidence percentage in [0, 100].
    pub confidence: i64,
    pub metadata: crate::display::DocumentMetadata,
    pub overview: String,
}
