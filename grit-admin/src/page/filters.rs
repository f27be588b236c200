//! Table filter controls and their string encoding
//!
//! Every filter value is a string sent as `<key>=<value>`. Ranges encode as
//! `min,max` with either side allowed to be empty.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::resource::{FilterDefinition, FilterType};

/// One entry of a select-style filter control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChoice {
    pub label: String,
    pub value: String,
}

/// Choices for select and boolean filters, led by the "All" entry that
/// clears the filter. Range filters have no choices.
pub fn filter_choices(filter: &FilterDefinition) -> Vec<FilterChoice> {
    let all = FilterChoice {
        label: filter
            .placeholder
            .clone()
            .unwrap_or_else(|| format!("All {}", filter.label)),
        value: String::new(),
    };
    match filter.filter_type {
        FilterType::Select => std::iter::once(all)
            .chain(filter.options.iter().map(|o| FilterChoice {
                label: o.label.clone(),
                value: o.value.clone(),
            }))
            .collect(),
        FilterType::Boolean => vec![
            all,
            FilterChoice {
                label: "Yes".into(),
                value: "true".into(),
            },
            FilterChoice {
                label: "No".into(),
                value: "false".into(),
            },
        ],
        FilterType::NumberRange | FilterType::DateRange => Vec::new(),
    }
}

/// Split a range value into its two sides
pub fn range_parts(value: &str) -> (&str, &str) {
    let mut parts = value.splitn(2, ',');
    (
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}

/// Join two range sides; both empty clears the filter
pub fn range_value(min: &str, max: &str) -> String {
    let (min, max) = (min.trim(), max.trim());
    if min.is_empty() && max.is_empty() {
        return String::new();
    }
    format!("{min},{max}")
}

/// Check and normalise a filter value typed on the command line
pub fn normalize_filter_value(filter: &FilterDefinition, raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    match filter.filter_type {
        FilterType::Select => {
            if filter.options.is_empty() {
                return Ok(raw.to_string());
            }
            match filter
                .options
                .iter()
                .find(|o| o.value == raw || o.label.eq_ignore_ascii_case(raw))
            {
                Some(option) => Ok(option.value.clone()),
                None => bail!("Unknown value '{}' for filter {}", raw, filter.label),
            }
        }
        FilterType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok("true".into()),
            "false" | "no" | "0" => Ok("false".into()),
            _ => bail!("Filter {} expects yes or no", filter.label),
        },
        FilterType::NumberRange => {
            let (min, max) = range_parts(raw);
            for side in [min, max] {
                if !side.trim().is_empty() && side.trim().parse::<f64>().is_err() {
                    bail!("Filter {} expects numbers as min,max", filter.label);
                }
            }
            Ok(range_value(min, max))
        }
        FilterType::DateRange => {
            let (start, end) = range_parts(raw);
            for side in [start, end] {
                if !side.trim().is_empty() && NaiveDate::parse_from_str(side.trim(), "%Y-%m-%d").is_err() {
                    bail!("Filter {} expects dates as YYYY-MM-DD,YYYY-MM-DD", filter.label);
                }
            }
            Ok(range_value(start, end))
        }
    }
}

/// Parse a `key=value` command line filter
pub fn parse_filter_arg(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("Filters are written key=value, got '{}'", arg),
    }
}

/// Active filter values; an empty value removes the key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    values: BTreeMap<String, String>,
}

impl FilterState {
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), value.to_string());
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn has_active(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}
