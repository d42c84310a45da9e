//! Unix `/etc/shadow` and `/etc/passwd` codecs.
//!
//! Documented render placeholders: `shadow` emits `*` for accounts without a
//! hash and fixed password-aging fields; `passwd` emits `x` in the password
//! slot and default uid/gid/home/shell when the record carries none.
use std::fmt::Write as _;

use crate::codec::{Codec, ParseError, RenderError};
use crate::hashid::detect_hash_type;
use crate::record::{Dataset, Hash, Record};

use super::text_of;

pub struct Shadow;

impl Codec for Shadow {
    fn name(&self) -> &'static str {
        "shadow"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();

        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 2 {
                continue;
            }
            let mut r = Record::new();
            r.username = fields[0].to_string();
            let hash_field = fields[1];
            if hash_field.is_empty() || matches!(hash_field, "*" | "!" | "!!") {
                r.extra_str("account_status", "locked");
            } else {
                r.hash = Some(Hash {
                    hash_type: detect_hash_type(hash_field),
                    value: hash_field.to_string(),
                });
            }
            records.push(r);
        }

        Ok(Dataset::assemble_uniform(
            self.name(),
            vec!["username".to_string(), "hash".to_string()],
            1.0,
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let hash_val = r.hash.as_ref().map(|h| h.value.as_str()).unwrap_or("*");
            // username:hash:lastchanged:min:max:warn:inactive:expire:reserved
            let _ = writeln!(out, "{}:{}:19000:0:99999:7:::", r.username, hash_val);
        }
        Ok(out.into_bytes())
    }
}

pub struct Passwd;

impl Codec for Passwd {
    fn name(&self) -> &'static str {
        "passwd"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();

        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 7 {
                continue;
            }
            let mut r = Record::new();
            r.username = fields[0].to_string();
            r.extra_str("uid", fields[2]);
            r.extra_str("gid", fields[3]);
            r.extra_str("gecos", fields[4]);
            r.extra_str("home", fields[5]);
            r.extra_str("shell", fields[6]);
            if !fields[4].is_empty() {
                r.name = fields[4].to_string();
            }
            records.push(r);
        }

        Ok(Dataset::assemble(
            self.name(),
            vec!["username".to_string(), "name".to_string()],
            [("username".to_string(), 1.0), ("name".to_string(), 0.8)]
                .into_iter()
                .collect(),
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let uid = non_empty_or(r.extra_get("uid"), "1000");
            let gid = non_empty_or(r.extra_get("gid"), "1000");
            let default_home = format!("/home/{}", r.username);
            let home = non_empty_or(r.extra_get("home"), &default_home);
            let shell = non_empty_or(r.extra_get("shell"), "/bin/bash");
            let _ = writeln!(
                out,
                "{}:x:{}:{}:{}:{}:{}",
                r.username, uid, gid, r.name, home, shell
            );
        }
        Ok(out.into_bytes())
    }
}

fn non_empty_or<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.is_empty() { default } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HashType;

    #[test]
    fn shadow_locked_accounts_have_no_hash() {
        let ds = Shadow
            .parse(b"root:$6$salt$digest:19000:0:99999:7:::\ndaemon:*:19000:0:99999:7:::\n")
            .unwrap();
        assert_eq!(ds.meta.record_count, 2);
        assert_eq!(
            ds.records[0].hash.as_ref().unwrap().hash_type,
            HashType::Sha512Crypt
        );
        assert!(ds.records[1].hash.is_none());
        assert_eq!(ds.records[1].extra_get("account_status"), "locked");
    }

    #[test]
    fn shadow_render_uses_star_placeholder() {
        let ds = Shadow.parse(b"daemon:!:1::::::\n").unwrap();
        let out = String::from_utf8(Shadow.render(&ds).unwrap()).unwrap();
        assert!(out.starts_with("daemon:*:"));
    }

    #[test]
    fn passwd_captures_gecos_as_name() {
        let ds = Passwd
            .parse(b"alice:x:1000:1000:Alice Liddell:/home/alice:/bin/zsh\n")
            .unwrap();
        let r = &ds.records[0];
        assert_eq!(r.username, "alice");
        assert_eq!(r.name, "Alice Liddell");
        assert_eq!(r.extra_get("shell"), "/bin/zsh");
    }

    #[test]
    fn passwd_short_lines_are_skipped() {
        let ds = Passwd.parse(b"broken:line\n").unwrap();
        assert_eq!(ds.meta.record_count, 0);
    }
}
