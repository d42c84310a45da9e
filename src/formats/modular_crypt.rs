//! Modular-crypt-format hash lines (`$algo$...`), optionally prefixed with a
//! username. Salt and parameters embedded in the hash string are lifted into
//! the record.
use crate::codec::{Codec, ParseError, RenderError};
use crate::hashid::{decompose_mcf, detect_hash_type};
use crate::record::{Dataset, Hash, Record, Salt, SaltEncoding};

use super::text_of;

pub struct ModularCrypt;

impl Codec for ModularCrypt {
    fn name(&self) -> &'static str {
        "modular_crypt"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (user, hash_str) = if let Some(idx) = line.find(":$") {
                (&line[..idx], &line[idx + 1..])
            } else if line.starts_with('$') {
                ("", line)
            } else if let Some((u, h)) = line.split_once(':') {
                (u, h)
            } else {
                ("", line)
            };

            let mut r = Record::new();
            r.hash = Some(Hash {
                hash_type: detect_hash_type(hash_str),
                value: hash_str.to_string(),
            });
            if !user.is_empty() {
                r.username = user.to_string();
            }

            let (salt, params) = decompose_mcf(hash_str);
            if !salt.is_empty() {
                r.salt = Some(Salt {
                    value: salt,
                    encoding: SaltEncoding::Utf8,
                });
            }
            if !params.is_empty() {
                r.extra_str("params", params);
            }

            records.push(r);
        }

        let mut cols = vec!["hash".to_string()];
        if records.iter().any(|r| !r.username.is_empty()) {
            cols.insert(0, "username".to_string());
        }
        Ok(Dataset::assemble_uniform(self.name(), cols, 1.0, records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let Some(h) = &r.hash else { continue };
            if !r.username.is_empty() {
                out.push_str(&r.username);
                out.push(':');
            }
            out.push_str(&h.value);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}
