//! Hash-list codecs: bare hash lines, `user:hash`, `hash:salt`, and the
//! John-the-Ripper / hashcat potfile shapes.
use crate::classify::split_user_hash;
use crate::codec::{Codec, ParseError, RenderError};
use crate::hashid::{detect_hash_type, guess_salt_encoding};
use crate::record::{Dataset, Hash, Record, Salt};

use super::text_of;

fn hash_dataset(name: &str, cols: &[&str], records: Vec<Record>) -> Dataset {
    Dataset::assemble_uniform(
        name,
        cols.iter().map(|c| c.to_string()).collect(),
        1.0,
        records,
    )
}

/// One hash per line, nothing else.
pub struct HashlistPlain;

impl Codec for HashlistPlain {
    fn name(&self) -> &'static str {
        "hashlist_plain"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let mut r = Record::new();
            r.hash = Some(Hash {
                hash_type: detect_hash_type(line),
                value: line.to_string(),
            });
            records.push(r);
        }
        Ok(hash_dataset(self.name(), &["hash"], records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            if let Some(h) = &r.hash {
                out.push_str(&h.value);
                out.push('\n');
            }
        }
        Ok(out.into_bytes())
    }
}

/// `user:hash`, tolerant of MCF hashes that contain colons.
pub struct HashlistUserHash;

impl Codec for HashlistUserHash {
    fn name(&self) -> &'static str {
        "hashlist_user_hash"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let (user, hash) = split_user_hash(line);
            let mut r = Record::new();
            r.username = user;
            r.hash = Some(Hash {
                hash_type: detect_hash_type(&hash),
                value: hash,
            });
            records.push(r);
        }
        Ok(hash_dataset(self.name(), &["username", "hash"], records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            let Some(h) = &r.hash else { continue };
            let name = if !r.username.is_empty() {
                &r.username
            } else {
                &r.email
            };
            out.push_str(name);
            out.push(':');
            out.push_str(&h.value);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// `hash:salt`.
pub struct HashlistHashSalt;

impl Codec for HashlistHashSalt {
    fn name(&self) -> &'static str {
        "hashlist_hash_salt"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let Some((hash_val, salt_val)) = line.split_once(':') else {
                continue;
            };
            let mut r = Record::new();
            r.hash = Some(Hash {
                hash_type: detect_hash_type(hash_val),
                value: hash_val.to_string(),
            });
            r.salt = Some(Salt {
                value: salt_val.to_string(),
                encoding: guess_salt_encoding(salt_val),
            });
            records.push(r);
        }
        Ok(hash_dataset(self.name(), &["hash", "salt"], records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        for r in &ds.records {
            if let Some(h) = &r.hash {
                out.push_str(&h.value);
                out.push(':');
                if let Some(s) = &r.salt {
                    out.push_str(&s.value);
                }
                out.push('\n');
            }
        }
        Ok(out.into_bytes())
    }
}

/// John-the-Ripper potfile: `hash:plaintext`, split on the last colon.
pub struct JtrPot;

/// hashcat potfile: same line shape as JtR output.
pub struct HashcatPot;

fn parse_pot(name: &'static str, raw: &[u8]) -> Result<Dataset, ParseError> {
    let text = text_of(raw);
    let mut records = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let Some(idx) = line.rfind(':') else {
            continue;
        };
        let (hash_val, plain) = (&line[..idx], &line[idx + 1..]);
        let mut r = Record::new();
        r.hash = Some(Hash {
            hash_type: detect_hash_type(hash_val),
            value: hash_val.to_string(),
        });
        r.password = plain.to_string();
        records.push(r);
    }
    Ok(hash_dataset(name, &["hash", "password"], records))
}

fn render_pot(ds: &Dataset) -> Result<Vec<u8>, RenderError> {
    let mut out = String::new();
    for r in &ds.records {
        if let Some(h) = &r.hash {
            out.push_str(&h.value);
            out.push(':');
            out.push_str(&r.password);
            out.push('\n');
        }
    }
    Ok(out.into_bytes())
}

impl Codec for JtrPot {
    fn name(&self) -> &'static str {
        "jtr_pot"
    }
    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        parse_pot(self.name(), raw)
    }
    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        render_pot(ds)
    }
}

impl Codec for HashcatPot {
    fn name(&self) -> &'static str {
        "hashcat_pot"
    }
    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        parse_pot(self.name(), raw)
    }
    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        render_pot(ds)
    }
}
