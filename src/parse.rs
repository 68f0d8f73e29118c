use crate::types::{Polygon, PredictionRecord};
use serde_json::Value;

/// One entry of the raw prediction map, classified once up front. The API
/// response is untyped JSON, so the sniffing lives here and nowhere else:
/// after classification the traversal is a plain pattern match.
enum FieldNode<'a> {
    /// Scalar field located on the page: `{value, confidence, polygon}`.
    Scalar {
        field: &'a serde_json::Map<String, Value>,
        polygon: Polygon,
    },
    /// Ordered list of line-item objects.
    Items(&'a [Value]),
    /// Anything else: nested metadata (e.g. locale), polygon-less scalars,
    /// empty sequences, nulls. Produces no display record.
    Metadata,
}

fn classify(value: &Value) -> FieldNode<'_> {
    match value {
        Value::Object(field) => match parse_polygon(field.get("polygon")) {
            Some(polygon) => FieldNode::Scalar { field, polygon },
            None => FieldNode::Metadata,
        },
        Value::Array(items) if !items.is_empty() => FieldNode::Items(items),
        _ => FieldNode::Metadata,
    }
}

/// Parse a raw polygon value into an ordered point list. A polygon counts as
/// present only when at least one valid `[x, y]` point survives.
fn parse_polygon(value: Option<&Value>) -> Option<Polygon> {
    let points = value?.as_array()?;
    let parsed: Polygon = points
        .iter()
        .filter_map(|point| {
            let pair = point.as_array()?;
            Some([pair.first()?.as_f64()?, pair.get(1)?.as_f64()?])
        })
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// "total_amount" -> "Total Amount".
fn field_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scalar field value rendered for display; None when absent or empty.
fn display_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric line-item operand for the "{quantity} unit x {price} = {total}"
/// string. Missing operands render as the literal text "undefined" - the
/// formatting the web client always shipped with. Known cosmetic quirk,
/// kept until a product decision says otherwise.
fn item_operand(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "undefined".to_string(),
    }
}

fn line_item_record(key: &str, index: usize, item: &Value) -> PredictionRecord {
    let description = item
        .get("description")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let (name, value) = match description {
        Some(description) => {
            let quantity = item.get("quantity").and_then(Value::as_f64);
            let plural = if quantity.map_or(false, |q| q > 1.0) {
                "s"
            } else {
                ""
            };
            (
                format!("Item {}: {}", index, description),
                format!(
                    "{} unit{} x {} = {}",
                    item_operand(item, "quantity"),
                    plural,
                    item_operand(item, "unit_price"),
                    item_operand(item, "total_amount"),
                ),
            )
        }
        None => (format!("{} {}", key, index), "N/A".to_string()),
    };
    PredictionRecord {
        id: format!("{}{}", key, index),
        name,
        value,
        coordinates: parse_polygon(item.get("polygon")),
    }
}

/// Flatten the raw prediction map into an ordered list of display records.
///
/// Pure and deterministic: same input, same output, same order (map order is
/// the API response order, item order is the sequence order). Missing fields
/// fall back to "N/A"; they never fail the transform.
pub fn flatten(prediction: &Value) -> Result<Vec<PredictionRecord>, String> {
    let map = prediction
        .as_object()
        .ok_or("Prediction must be a JSON object")?;
    let mut records = Vec::new();
    for (key, entry) in map {
        match classify(entry) {
            FieldNode::Scalar { field, polygon } => {
                records.push(PredictionRecord {
                    id: key.clone(),
                    name: field_label(key),
                    value: display_value(field.get("value")).unwrap_or_else(|| "N/A".to_string()),
                    coordinates: Some(polygon),
                });
            }
            FieldNode::Items(items) => {
                for (index, item) in items.iter().enumerate() {
                    records.push(line_item_record(key, index, item));
                }
            }
            FieldNode::Metadata => {}
        }
    }
    Ok(records)
}

/// Aggregate confidence percentage: floor(100 x mean) over every numeric
/// `confidence` value in the tree, at any depth, excluding zeros. Returns 0
/// when the tree holds no usable confidence at all.
pub fn average_confidence(prediction: &Value) -> i64 {
    let mut confidences = Vec::new();
    collect_confidences(prediction, &mut confidences);
    if confidences.is_empty() {
        return 0;
    }
    let sum: f64 = confidences.iter().sum();
    ((sum / confidences.len() as f64) * 100.0).floor() as i64
}

fn collect_confidences(value: &Value, out: &mut Vec<f64>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "confidence" {
                    if let Some(n) = child.as_f64() {
                        if n != 0.0 {
                            out.push(n);
                        }
                        continue;
                    }
                }
                collect_confidences(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_confidences(item, out);
            }
        }
        // Null and scalar leaves carry no confidence.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_empty_prediction_yields_no_records() {
        let records = flatten(&json!({})).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn flatten_rejects_non_object_prediction() {
        assert!(flatten(&Value::Null).is_err());
        assert!(flatten(&json!([1, 2])).is_err());
    }

    #[test]
    fn flatten_scalar_field_with_polygon() {
        let prediction = json!({
            "total_amount": {
                "value": 42.5,
                "polygon": [[0, 0], [1, 0], [1, 1], [0, 1]]
            }
        });
        let records = flatten(&prediction).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "total_amount");
        assert_eq!(records[0].name, "Total Amount");
        assert_eq!(records[0].value, "42.5");
        assert_eq!(
            records[0].coordinates,
            Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
        );
    }

    #[test]
    fn flatten_skips_scalar_without_polygon() {
        let prediction = json!({
            "document_type": { "value": "INVOICE", "confidence": 0.99 },
            "locale": { "language": "en", "currency": "USD" }
        });
        let records = flatten(&prediction).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn flatten_line_item_with_description() {
        let prediction = json!({
            "line_items": [{
                "description": "Widget",
                "quantity": 2,
                "unit_price": 5,
                "total_amount": 10,
                "confidence": 0.9
            }]
        });
        let records = flatten(&prediction).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "line_items0");
        assert_eq!(records[0].name, "Item 0: Widget");
        assert_eq!(records[0].value, "2 units x 5 = 10");
        assert_eq!(records[0].coordinates, None);
    }

    #[test]
    fn flatten_single_quantity_is_singular() {
        let prediction = json!({
            "line_items": [{
                "description": "Widget",
                "quantity": 1,
                "unit_price": 5,
                "total_amount": 5
            }]
        });
        let records = flatten(&prediction).unwrap();
        assert_eq!(records[0].value, "1 unit x 5 = 5");
    }

    #[test]
    fn flatten_missing_item_numbers_render_as_undefined() {
        let prediction = json!({
            "line_items": [{ "description": "Widget" }]
        });
        let records = flatten(&prediction).unwrap();
        assert_eq!(records[0].value, "undefined unit x undefined = undefined");
    }

    #[test]
    fn flatten_item_without_description_falls_back() {
        let prediction = json!({
            "taxes": [{ "rate": 20, "polygon": [[0.1, 0.2], [0.3, 0.4]] }]
        });
        let records = flatten(&prediction).unwrap();
        assert_eq!(records[0].id, "taxes0");
        assert_eq!(records[0].name, "taxes 0");
        assert_eq!(records[0].value, "N/A");
        assert_eq!(records[0].coordinates, Some(vec![[0.1, 0.2], [0.3, 0.4]]));
    }

    #[test]
    fn flatten_missing_scalar_value_is_not_available() {
        let prediction = json!({
            "due_date": { "polygon": [[0, 0], [1, 1]] },
            "supplier": { "value": "", "polygon": [[0, 0], [1, 1]] }
        });
        let records = flatten(&prediction).unwrap();
        assert_eq!(records[0].value, "N/A");
        assert_eq!(records[1].value, "N/A");
    }

    #[test]
    fn flatten_preserves_field_and_item_order() {
        let prediction = json!({
            "total_amount": { "value": 10, "polygon": [[0, 0]] },
            "line_items": [
                { "description": "A", "quantity": 1, "unit_price": 1, "total_amount": 1 },
                { "description": "B", "quantity": 1, "unit_price": 2, "total_amount": 2 }
            ],
            "due_date": { "value": "2024-01-31", "polygon": [[0, 0]] }
        });
        let first = flatten(&prediction).unwrap();
        let second = flatten(&prediction).unwrap();
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["total_amount", "line_items0", "line_items1", "due_date"]
        );
    }

    #[test]
    fn flatten_ignores_empty_polygon_and_empty_sequence() {
        let prediction = json!({
            "empty_polygon": { "value": "x", "polygon": [] },
            "no_items": []
        });
        let records = flatten(&prediction).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn average_excludes_zero_confidence() {
        let prediction = json!({
            "a": { "confidence": 0.5 },
            "b": { "confidence": 0 }
        });
        assert_eq!(average_confidence(&prediction), 50);
    }

    #[test]
    fn average_of_empty_prediction_is_zero() {
        assert_eq!(average_confidence(&json!({})), 0);
        assert_eq!(average_confidence(&Value::Null), 0);
    }

    #[test]
    fn average_walks_nested_objects_and_arrays() {
        let prediction = json!({
            "total_amount": { "value": 10, "confidence": 0.8 },
            "line_items": [
                { "description": "A", "confidence": 0.6 },
                { "description": "B", "confidence": 0.4, "tax": { "confidence": 0.2 } }
            ],
            "locale": { "language": "en" }
        });
        // mean(0.8, 0.6, 0.4, 0.2) = 0.5
        assert_eq!(average_confidence(&prediction), 50);
    }

    #[test]
    fn average_skips_null_and_non_numeric_leaves() {
        let prediction = json!({
            "a": { "confidence": "high" },
            "b": null,
            "c": { "nested": null, "confidence": 0.3 }
        });
        assert_eq!(average_confidence(&prediction), 30);
    }

    #[test]
    fn average_floors_the_percentage() {
        let prediction = json!({
            "a": { "confidence": 0.335 },
            "b": { "confidence": 0.332 }
        });
        // mean = 0.3335 -> 33.35 -> 33
        assert_eq!(average_confidence(&prediction), 33);
    }

    #[test]
    fn field_label_capitalizes_each_word() {
        assert_eq!(field_label("total_amount"), "Total Amount");
        assert_eq!(field_label("due_date"), "Due Date");
        assert_eq!(field_label("supplier"), "Supplier");
    }
}
