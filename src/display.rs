use serde::Serialize;
use serde_json::Value;

/// ISO 639-1 language code -> English display name. Covers the languages the
/// financial-document product actually emits; anything else falls back to
/// the raw code.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hu", "Hungarian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("nb", "Norwegian Bokmal"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("zh", "Chinese"),
];

/// ISO 4217 currency code -> (display name, symbol).
const CURRENCY_NAMES: &[(&str, &str, &str)] = &[
    ("AUD", "Australian Dollar", "A$"),
    ("BRL", "Brazilian Real", "R$"),
    ("CAD", "Canadian Dollar", "CA$"),
    ("CHF", "Swiss Franc", "CHF"),
    ("CNY", "Chinese Yuan", "CN¥"),
    ("CZK", "Czech Koruna", "Kč"),
    ("DKK", "Danish Krone", "kr"),
    ("EUR", "Euro", "€"),
    ("GBP", "British Pound", "£"),
    ("HUF", "Hungarian Forint", "Ft"),
    ("INR", "Indian Rupee", "₹"),
    ("JPY", "Japanese Yen", "¥"),
    ("MKD", "Macedonian Denar", "ден"),
    ("NOK", "Norwegian Krone", "kr"),
    ("NZD", "New Zealand Dollar", "NZ$"),
    ("PLN", "Polish Zloty", "zł"),
    ("RON", "Romanian Leu", "lei"),
    ("SEK", "Swedish Krona", "kr"),
    ("USD", "US Dollar", "$"),
];

/// Resolve a language code to a display name; unknown codes come back
/// unchanged. Never fails the render.
pub fn language_name(code: &str) -> String {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Resolve a currency code to "Name (symbol)"; unknown codes come back
/// unchanged.
pub fn currency_name(code: &str) -> String {
    CURRENCY_NAMES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name, symbol)| format!("{} ({})", name, symbol))
        .unwrap_or_else(|| code.to_string())
}

/// The six fixed fields read straight from the raw prediction, formatted for
/// the "Document Metadata" group and the overview paragraph.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    pub language: String,
    pub currency: String,
    pub document_type: String,
    pub total_amount: String,
    pub due_date: String,
    pub orientation: String,
    pub item_count: usize,
}

fn string_at<'a>(prediction: &'a Value, field: &str, key: &str) -> Option<&'a str> {
    prediction
        .get(field)
        .and_then(|f| f.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn value_at(prediction: &Value, field: &str) -> String {
    match prediction.get(field).and_then(|f| f.get("value")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn orientation_label(orientation: i64) -> &'static str {
    if orientation == 0 {
        "Portrait"
    } else {
        "Landscape"
    }
}

/// Read the fixed metadata fields. Missing locale codes degrade to "N/A",
/// missing values to the empty string; nothing here can fail.
pub fn document_metadata(prediction: &Value, orientation: i64) -> DocumentMetadata {
    let language = string_at(prediction, "locale", "language")
        .map(language_name)
        .unwrap_or_else(|| "N/A".to_string());
    let currency = string_at(prediction, "locale", "currency")
        .map(currency_name)
        .unwrap_or_else(|| "N/A".to_string());
    let item_count = prediction
        .get("line_items")
        .and_then(Value::as_array)
        .map(|items| items.len())
        .unwrap_or(0);
    DocumentMetadata {
        language,
        currency,
        document_type: value_at(prediction, "document_type"),
        total_amount: value_at(prediction, "total_amount"),
        due_date: value_at(prediction, "due_date"),
        orientation: orientation_label(orientation).to_string(),
        item_count,
    }
}

/// Labeled list for the "Document Metadata" group, in fixed order.
pub fn fixed_fields(metadata: &DocumentMetadata) -> Vec<(&'static str, String)> {
    vec![
        ("Language", metadata.language.clone()),
        ("Currency", metadata.currency.clone()),
        ("Document Type", metadata.document_type.clone()),
        ("Total Amount", metadata.total_amount.clone()),
        ("Due Date", metadata.due_date.clone()),
        ("Orientation", metadata.orientation.clone()),
    ]
}

/// One-paragraph human-readable summary shown above the field list.
pub fn overview_sentence(metadata: &DocumentMetadata) -> String {
    format!(
        "This {} document is written in {} in {} format. It contains a total of {} items for an amount of {} {} due by {}.",
        metadata.document_type.to_lowercase(),
        metadata.language,
        metadata.orientation,
        metadata.item_count,
        metadata.total_amount,
        metadata.currency,
        metadata.due_date,
    )
}

/// Expand/collapse state of the two summary-panel groups. Both default to
/// expanded and toggle independently.
#[derive(Debug, Clone, Serialize)]
pub struct SectionState {
    pub metadata_open: bool,
    pub items_open: bool,
}

impl Default for SectionState {
    fn default() -> Self {
        SectionState {
            metadata_open: true,
            items_open: true,
        }
    }
}

impl SectionState {
    /// Toggle one group by name; returns the new open flag.
    pub fn toggle(&mut self, section: &str) -> Result<bool, String> {
        match section {
            "metadata" => {
                self.metadata_open = !self.metadata_open;
                Ok(self.metadata_open)
            }
            "items" => {
                self.items_open = !self.items_open;
                Ok(self.items_open)
            }
            other => Err(format!("Unknown section: {}", other)),
        }
    }
}
