//! Coercion of raw text input into typed field values

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::render::format::parse_timestamp;
use crate::resource::{FieldDefinition, FieldType};

const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Turn what the user typed into the value stored for `field`.
///
/// Rejections carry the message shown next to the input; the previous value
/// is kept by the caller.
pub fn coerce_input(field: &FieldDefinition, raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    match field.field_type {
        FieldType::Number => coerce_number(field, trimmed),
        FieldType::Toggle | FieldType::Checkbox => coerce_bool(field, trimmed),
        FieldType::Select | FieldType::Radio => coerce_option(field, trimmed),
        FieldType::Date => coerce_date(field, trimmed),
        FieldType::Datetime => coerce_datetime(field, trimmed),
        FieldType::RelationshipSelect => {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            parse_id(trimmed)
                .map(Value::from)
                .ok_or_else(|| format!("{} must be a record id", field.label))
        }
        FieldType::MultiRelationshipSelect => split_list(trimmed)
            .map(|part| {
                parse_id(part)
                    .map(Value::from)
                    .ok_or_else(|| format!("{} must be a list of record ids", field.label))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        FieldType::Images | FieldType::Videos | FieldType::Files => Ok(Value::Array(
            split_list(trimmed).map(|s| Value::String(s.to_string())).collect(),
        )),
        FieldType::Textarea | FieldType::Richtext => Ok(Value::String(raw.to_string())),
        _ => Ok(Value::String(trimmed.to_string())),
    }
}

fn coerce_number(field: &FieldDefinition, raw: &str) -> Result<Value, String> {
    if raw.is_empty() {
        return Ok(Value::String(String::new()));
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("{} must be a number", field.label))
}

fn coerce_bool(field: &FieldDefinition, raw: &str) -> Result<Value, String> {
    match raw.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" => Ok(Value::Bool(true)),
        "" | "n" | "no" | "false" | "0" | "off" => Ok(Value::Bool(false)),
        _ => Err(format!("{} must be yes or no", field.label)),
    }
}

fn coerce_option(field: &FieldDefinition, raw: &str) -> Result<Value, String> {
    if raw.is_empty() || field.options.is_empty() {
        return Ok(Value::String(raw.to_string()));
    }
    field
        .options
        .iter()
        .find(|o| o.value == raw || o.label.eq_ignore_ascii_case(raw))
        .map(|o| Value::String(o.value.clone()))
        .ok_or_else(|| {
            let allowed: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
            format!("{} must be one of: {}", field.label, allowed.join(", "))
        })
}

fn coerce_date(field: &FieldDefinition, raw: &str) -> Result<Value, String> {
    if raw.is_empty() {
        return Ok(Value::String(String::new()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
        .map_err(|_| format!("{} must be a date (YYYY-MM-DD)", field.label))
}

fn coerce_datetime(field: &FieldDefinition, raw: &str) -> Result<Value, String> {
    if raw.is_empty() {
        return Ok(Value::String(String::new()));
    }
    let parsed = NaiveDateTime::parse_from_str(raw, DATETIME_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.naive_utc()));
    parsed
        .map(|dt| Value::String(dt.format(DATETIME_INPUT_FORMAT).to_string()))
        .ok_or_else(|| format!("{} must be a date and time (YYYY-MM-DD HH:MM)", field.label))
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SelectOption;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        let price = FieldDefinition::new("price", "Price", FieldType::Number);
        assert_eq!(coerce_input(&price, "").unwrap(), json!(""));
        assert_eq!(coerce_input(&price, " 42 ").unwrap(), json!(42));
        assert_eq!(coerce_input(&price, "9.5").unwrap(), json!(9.5));
        assert_eq!(coerce_input(&price, "abc").unwrap_err(), "Price must be a number");
    }

    #[test]
    fn test_toggle_coercion() {
        let active = FieldDefinition::new("active", "Active", FieldType::Toggle);
        assert_eq!(coerce_input(&active, "yes").unwrap(), json!(true));
        assert_eq!(coerce_input(&active, "").unwrap(), json!(false));
        assert!(coerce_input(&active, "maybe").is_err());
    }

    #[test]
    fn test_select_accepts_value_or_label() {
        let role = FieldDefinition::new("role", "Role", FieldType::Select).options(vec![
            SelectOption::new("Admin", "ADMIN"),
            SelectOption::new("User", "USER"),
        ]);
        assert_eq!(coerce_input(&role, "admin").unwrap(), json!("ADMIN"));
        assert_eq!(coerce_input(&role, "USER").unwrap(), json!("USER"));
        assert_eq!(
            coerce_input(&role, "root").unwrap_err(),
            "Role must be one of: ADMIN, USER"
        );
    }

    #[test]
    fn test_dates() {
        let date = FieldDefinition::new("due", "Due", FieldType::Date);
        assert_eq!(coerce_input(&date, "2024-02-29").unwrap(), json!("2024-02-29"));
        assert!(coerce_input(&date, "2023-02-29").is_err());

        let at = FieldDefinition::new("at", "At", FieldType::Datetime);
        assert_eq!(coerce_input(&at, "2024-03-01 09:30").unwrap(), json!("2024-03-01T09:30"));
    }

    #[test]
    fn test_relationship_ids() {
        let author = FieldDefinition::new("user_id", "Author", FieldType::RelationshipSelect);
        assert_eq!(coerce_input(&author, "7").unwrap(), json!(7));
        assert_eq!(coerce_input(&author, "").unwrap(), Value::Null);

        let labels = FieldDefinition::new("label_ids", "Labels", FieldType::MultiRelationshipSelect);
        assert_eq!(coerce_input(&labels, "1, 3,").unwrap(), json!([1, 3]));
        assert!(coerce_input(&labels, "1,x").is_err());
    }
}
