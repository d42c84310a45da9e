//! Combo-list codecs: colon-delimited credential lines in the common
//! `user:pass`, `email:pass`, `user:pass:url`, and extended variable-field
//! layouts.
use crate::classify::{classify_identity, split_combo_fields};
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record, UnknownField};

use super::text_of;

fn combo_dataset(name: &str, cols: &[&str], conf: &[(&str, f64)], records: Vec<Record>) -> Dataset {
    let confidence = conf
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect::<std::collections::BTreeMap<_, _>>();
    Dataset::assemble(
        name,
        cols.iter().map(|c| c.to_string()).collect(),
        confidence,
        records,
    )
}

/// `user:pass` (or `email:pass`, auto-detected on the `@` sign).
pub struct ComboUserPass;

impl Codec for ComboUserPass {
    fn name(&self) -> &'static str {
        "combolist_user_pass"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let mut r = Record::new();
            match line.split_once(':') {
                Some((ident, pass)) => {
                    classify_identity(&mut r, ident);
                    r.password = pass.to_string();
                }
                None => classify_identity(&mut r, line),
            }
            records.push(r);
        }
        Ok(combo_dataset(
            self.name(),
            &["email", "username", "password"],
            &[("email", 0.8), ("username", 0.8), ("password", 1.0)],
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let mut ident = if !r.email.is_empty() {
                r.email.as_str()
            } else {
                r.username.as_str()
            };
            if ident.is_empty()
                && let Some(u) = r.unknowns.first()
            {
                ident = &u.value;
            }
            out.push_str(ident);
            out.push(':');
            out.push_str(&r.password);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// `email:pass`, the identity column taken as email verbatim.
pub struct ComboEmailPass;

impl Codec for ComboEmailPass {
    fn name(&self) -> &'static str {
        "combolist_email_pass"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let mut r = Record::new();
            match line.split_once(':') {
                Some((email, pass)) => {
                    r.email = email.to_string();
                    r.password = pass.to_string();
                }
                None => r.email = line.to_string(),
            }
            records.push(r);
        }
        Ok(combo_dataset(
            self.name(),
            &["email", "password"],
            &[("email", 1.0), ("password", 1.0)],
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let email = if !r.email.is_empty() {
                &r.email
            } else {
                &r.username
            };
            out.push_str(email);
            out.push(':');
            out.push_str(&r.password);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// `user:pass:url`.
pub struct ComboUserPassUrl;

impl Codec for ComboUserPassUrl {
    fn name(&self) -> &'static str {
        "combolist_user_pass_url"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.splitn(3, ':').collect();
            let mut r = Record::new();
            if !parts.is_empty() {
                classify_identity(&mut r, parts[0]);
            }
            if parts.len() >= 2 {
                r.password = parts[1].to_string();
            }
            if parts.len() >= 3 {
                r.url = parts[2].to_string();
            }
            records.push(r);
        }
        Ok(combo_dataset(
            self.name(),
            &["email", "username", "password", "url"],
            &[
                ("email", 0.8),
                ("username", 0.8),
                ("password", 1.0),
                ("url", 1.0),
            ],
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let ident = if !r.email.is_empty() {
                &r.email
            } else {
                &r.username
            };
            out.push_str(ident);
            out.push(':');
            out.push_str(&r.password);
            out.push(':');
            out.push_str(&r.url);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// `user:pass:url:ip:...` — variable field count, url schemes rejoined,
/// trailing fields preserved as unknowns.
pub struct ComboExtended;

impl Codec for ComboExtended {
    fn name(&self) -> &'static str {
        "combolist_extended"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let parts = split_combo_fields(line);
            let mut r = Record::new();
            if !parts.is_empty() {
                classify_identity(&mut r, &parts[0]);
            }
            if parts.len() >= 2 {
                r.password = parts[1].clone();
            }
            if parts.len() >= 3 {
                r.url = parts[2].clone();
            }
            if parts.len() >= 4 {
                r.ip = parts[3].clone();
            }
            for extra in parts.iter().skip(4) {
                r.unknowns.push(UnknownField::bare(extra.clone()));
            }
            records.push(r);
        }
        Ok(combo_dataset(
            self.name(),
            &["email", "username", "password", "url", "ip"],
            &[
                ("email", 0.7),
                ("username", 0.7),
                ("password", 1.0),
                ("url", 0.8),
                ("ip", 0.6),
            ],
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let ident = if !r.email.is_empty() {
                &r.email
            } else {
                &r.username
            };
            out.push_str(ident);
            out.push(':');
            out.push_str(&r.password);
            if !r.url.is_empty() || !r.ip.is_empty() || !r.unknowns.is_empty() {
                out.push(':');
                out.push_str(&r.url);
            }
            if !r.ip.is_empty() || !r.unknowns.is_empty() {
                out.push(':');
                out.push_str(&r.ip);
            }
            for u in &r.unknowns {
                out.push(':');
                out.push_str(&u.value);
            }
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}
