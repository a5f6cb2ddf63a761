use serde_json::Value;

/// Print just the headline figure of a result.
///
/// Objects: the first priority field present. Record lists (alerts,
/// seasonal rows): one identifying line per record.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for line in minimal_lines(result_obj) {
        println!("{}", line);
    }
}

fn minimal_lines(result: &Value) -> Vec<String> {
    let priority_keys = [
        "projected_improvement",
        "collection_rate",
        "overall_confidence",
    ];

    match result {
        Value::Object(map) => {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        return vec![format_minimal(val)];
                    }
                }
            }
            map.iter()
                .next()
                .map(|(key, val)| vec![format!("{}: {}", key, format_minimal(val))])
                .unwrap_or_default()
        }
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => ["id", "month", "invoice_id"]
                    .iter()
                    .find_map(|k| map.get(*k))
                    .map(format_minimal)
                    .unwrap_or_else(|| format_minimal(item)),
                other => format_minimal(other),
            })
            .collect(),
        other => vec![format_minimal(other)],
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
