//! Client-side checks for file inputs and how uploaded URLs land in a value

use serde_json::Value;

use crate::resource::{FieldDefinition, FieldType, UploadKind};

const MIB: u64 = 1024 * 1024;

/// Largest accepted file for a field, in bytes
pub fn max_size(field: &FieldDefinition) -> u64 {
    field.max_size.unwrap_or(match field.field_type.upload_kind() {
        Some(UploadKind::Images) => 5 * MIB,
        Some(UploadKind::Videos) => 100 * MIB,
        _ => 10 * MIB,
    })
}

/// How many items a multi upload field may hold
pub fn max_items(field: &FieldDefinition) -> usize {
    if !field.field_type.is_multi() {
        return 1;
    }
    match field.max {
        Some(max) if max >= 1.0 => max as usize,
        _ if field.field_type == FieldType::Videos => 5,
        _ => 10,
    }
}

/// Accept pattern for a field: declared, or the kind's default
pub fn accept_pattern(field: &FieldDefinition) -> Option<&str> {
    field
        .accept
        .as_deref()
        .or_else(|| field.field_type.upload_kind()?.default_accept())
}

/// Whether `mime`/`file_name` match a comma separated accept list such as
/// `image/*,.pdf,application/zip`
pub fn accepts(pattern: &str, mime: &str, file_name: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    let name = file_name.to_ascii_lowercase();
    pattern
        .split(',')
        .map(|p| p.trim().to_ascii_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| {
            if let Some(ext) = p.strip_prefix('.') {
                name.ends_with(&format!(".{ext}"))
            } else if let Some(family) = p.strip_suffix("/*") {
                mime.split('/').next() == Some(family)
            } else {
                p == mime
            }
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCheck {
    Ok,
    Rejected(String),
}

/// Check a file before uploading it for `field`
pub fn check_upload(field: &FieldDefinition, file_name: &str, mime: &str, size: u64) -> UploadCheck {
    if let Some(pattern) = accept_pattern(field) {
        if !accepts(pattern, mime, file_name) {
            return UploadCheck::Rejected(format!("{file_name} is not an accepted file type"));
        }
    }
    let limit = max_size(field);
    if size > limit {
        return UploadCheck::Rejected(format!(
            "{file_name} is larger than {} MB",
            limit.div_ceil(MIB)
        ));
    }
    UploadCheck::Ok
}

/// Store uploaded URLs on a field value.
///
/// Single-file fields take the first URL; multi fields append, keeping at
/// most [`max_items`] entries.
pub fn apply_uploaded(field: &FieldDefinition, current: Option<&Value>, urls: Vec<String>) -> Value {
    if !field.field_type.is_multi() {
        return Value::String(urls.into_iter().next().unwrap_or_default());
    }
    let mut items: Vec<Value> = current
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let cap = max_items(field);
    for url in urls {
        if items.len() >= cap {
            break;
        }
        items.push(Value::String(url));
    }
    Value::Array(items)
}
