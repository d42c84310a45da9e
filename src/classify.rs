//! Field classification: maps a source field name + value onto a canonical
//! record field. This is the sole dispatch point every codec uses to decide
//! whether a value becomes a canonical field or falls through to
//! `extra`/`unknowns`.
use std::collections::BTreeMap;

use crate::record::{Record, normalize_phone};

/// Set the record field named by `field` (case-insensitive, exact synonym
/// match) to `value`. Returns false for any unrecognized name without
/// touching the record. Phone values additionally pass through
/// normalization.
pub fn classify_field(r: &mut Record, field: &str, value: &str) -> bool {
    match field.to_ascii_lowercase().as_str() {
        "email" | "e-mail" | "mail" | "email_address" => r.email = value.to_string(),
        "username" | "user" | "login" | "account" | "user_name" | "userid" => {
            r.username = value.to_string()
        }
        "password" | "pass" | "passwd" | "pwd" | "secret" => r.password = value.to_string(),
        "url" | "uri" | "link" | "website" | "site" => r.url = value.to_string(),
        "domain" | "host" | "hostname" => r.domain = value.to_string(),
        "ip" | "ip_address" | "ipaddress" | "ip_addr" => r.ip = value.to_string(),
        "phone" | "telephone" | "tel" | "mobile" | "phone_number" => {
            r.phone = normalize_phone(value)
        }
        "name" | "full_name" | "fullname" | "display_name" | "displayname" => {
            r.name = value.to_string()
        }
        _ => return false,
    }
    true
}

/// Identity column of a combo list: values containing `@` are treated as
/// email, everything else as username.
pub fn classify_identity(r: &mut Record, value: &str) {
    if value.contains('@') {
        r.email = value.to_string();
    } else {
        r.username = value.to_string();
    }
}

/// Project the populated canonical fields of a record into a string map.
pub fn record_to_map(r: &Record) -> BTreeMap<&'static str, String> {
    let mut m = BTreeMap::new();
    if !r.email.is_empty() {
        m.insert("email", r.email.clone());
    }
    if !r.username.is_empty() {
        m.insert("username", r.username.clone());
    }
    if !r.password.is_empty() {
        m.insert("password", r.password.clone());
    }
    if !r.url.is_empty() {
        m.insert("url", r.url.clone());
    }
    if !r.domain.is_empty() {
        m.insert("domain", r.domain.clone());
    }
    if !r.ip.is_empty() {
        m.insert("ip", r.ip.clone());
    }
    if !r.phone.is_empty() {
        m.insert("phone", r.phone.clone());
    }
    if !r.name.is_empty() {
        m.insert("name", r.name.clone());
    }
    if let Some(h) = &r.hash {
        m.insert("hash", h.value.clone());
    }
    m
}

/// Which canonical fields carry data anywhere in the record set, in first-seen
/// order.
pub fn detect_columns(records: &[Record]) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut cols = Vec::new();
    for r in records {
        for k in record_to_map(r).into_keys() {
            if seen.insert(k) {
                cols.push(k.to_string());
            }
        }
    }
    cols
}

/// Split a colon-delimited combo line, rejoining url schemes that the split
/// broke apart (`https://...` and friends).
pub fn split_combo_fields(line: &str) -> Vec<String> {
    let raw: Vec<&str> = line.split(':').collect();
    let mut fields = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if i + 1 < raw.len() && raw[i + 1].starts_with("//") {
            fields.push(format!("{}:{}", raw[i], raw[i + 1]));
            i += 2;
        } else {
            fields.push(raw[i].to_string());
            i += 1;
        }
    }
    fields
}

/// Split a `user:hash` line where hashes starting with `$` may themselves
/// contain colons.
pub fn split_user_hash(line: &str) -> (String, String) {
    if let Some(idx) = line.find(":$") {
        return (line[..idx].to_string(), line[idx + 1..].to_string());
    }
    match line.split_once(':') {
        Some((user, hash)) => (user.to_string(), hash.to_string()),
        None => (String::new(), line.to_string()),
    }
}
