pub mod alerts;
pub mod collections;
pub mod forecast;
pub mod optimize;
pub mod seasonal;

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::input;

/// Load the command's JSON input from `--input` or piped stdin.
pub fn read_input(path: Option<&str>, what: &str) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json_value(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(data)
    } else {
        Err(format!("--input <file.json> or stdin required for {}", what).into())
    }
}

/// Fill in `as_of` when the input document leaves it out.
pub fn default_as_of(mut value: Value, today: NaiveDate) -> Value {
    if let Value::Object(map) = &mut value {
        map.entry("as_of")
            .or_insert_with(|| Value::String(today.to_string()));
    }
    value
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Microseconds elapsed since `start`, saturating.
pub fn elapsed_us(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_as_of_inserted() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let value = default_as_of(json!({ "invoices": [] }), today);
        assert_eq!(value["as_of"], json!("2024-05-06"));
    }

    #[test]
    fn test_explicit_as_of_kept() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let value = default_as_of(json!({ "as_of": "2023-01-31" }), today);
        assert_eq!(value["as_of"], json!("2023-01-31"));
    }
}
