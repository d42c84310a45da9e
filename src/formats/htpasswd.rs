//! Apache htpasswd files: `user:hash` with `{SHA}`/`{SSHA}` prefixes mapped
//! to sha1.
use crate::codec::{Codec, ParseError, RenderError};
use crate::hashid::detect_hash_type;
use crate::record::{Dataset, Hash, HashType, Record};

use super::text_of;

pub struct Htpasswd;

impl Codec for Htpasswd {
    fn name(&self) -> &'static str {
        "htpasswd"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let text = text_of(raw);
        let mut records = Vec::new();

        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((user, hash_val)) = line.split_once(':') else {
                continue;
            };
            let hash_type = if hash_val.starts_with("{SHA}") || hash_val.starts_with("{SSHA}") {
                HashType::Sha1
            } else {
                detect_hash_type(hash_val)
            };
            let mut r = Record::new();
            r.username = user.to_string();
            r.hash = Some(Hash {
                hash_type,
                value: hash_val.to_string(),
            });
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
            let name = if !r.username.is_empty() {
                &r.username
            } else {
                &r.email
            };
            out.push_str(name);
            out.push(':');
            if let Some(h) = &r.hash {
                out.push_str(&h.value);
            }
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha_prefix_maps_to_sha1() {
        let ds = Htpasswd
            .parse(b"alice:{SHA}qUqP5cyxm6YcTAhz05Hph5gvu9M=\nbob:$apr1$s$d\n")
            .unwrap();
        assert_eq!(ds.records[0].hash.as_ref().unwrap().hash_type, HashType::Sha1);
        assert_eq!(ds.records[1].hash.as_ref().unwrap().hash_type, HashType::Apr1);
    }

    #[test]
    fn comments_and_bare_lines_skipped() {
        let ds = Htpasswd.parse(b"# header\nnocolon\nu:h\n").unwrap();
        assert_eq!(ds.meta.record_count, 1);
    }
}
