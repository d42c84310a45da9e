//! Kerberos keytab codec (MIT krb5 format, versions 0x0501 and 0x0502).
//!
//! Entries are length-prefixed with a signed 32-bit size. A negative size is
//! a tombstone for a deleted entry: the decoder skips `|size|` bytes and
//! continues scanning. A read that would exceed an entry's declared bounds
//! aborts only that entry; scanning resumes at the entry's declared end.
use byteorder::{BigEndian, WriteBytesExt};

use crate::binary::ByteScan;
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record};

const VERSION_V2: u16 = 0x0502;
const VERSION_V1: u16 = 0x0501;

pub struct KerberosKeytab;

impl Codec for KerberosKeytab {
    fn name(&self) -> &'static str {
        "kerberos_keytab"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let mut scan = ByteScan::new(raw);
        let Some(version) = scan.u16_be() else {
            return Err(ParseError::container(self.name(), "keytab too short"));
        };
        if version != VERSION_V2 && version != VERSION_V1 {
            return Err(ParseError::container(
                self.name(),
                format!("unsupported keytab version: 0x{version:04x}"),
            ));
        }

        let mut records = Vec::new();
        while !scan.is_empty() {
            let Some(entry_size) = scan.i32_be() else {
                break;
            };

            if entry_size <= 0 {
                // tombstone: skip the hole and keep scanning
                if !scan.skip(entry_size.unsigned_abs() as usize) {
                    break;
                }
                continue;
            }

            let entry_len = entry_size as usize;
            if scan.remaining() < entry_len {
                break;
            }
            let entry_end = scan.pos() + entry_len;
            if let Some(r) = parse_entry(&raw[scan.pos()..entry_end], version) {
                records.push(r);
            }
            scan.seek(entry_end);
        }

        if records.is_empty() {
            return Err(ParseError::ZeroRecoverable {
                format: self.name(),
            });
        }

        let cols = crate::classify::detect_columns(&records);
        Ok(Dataset::assemble_uniform(self.name(), cols, 1.0, records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        out.write_u16::<BigEndian>(VERSION_V2)?;

        for r in &ds.records {
            let mut entry = Vec::new();

            let components: Vec<&str> = r.username.split('/').collect();
            entry.write_u16::<BigEndian>(components.len() as u16)?;
            entry.write_u16::<BigEndian>(r.domain.len() as u16)?;
            entry.extend_from_slice(r.domain.as_bytes());
            for comp in &components {
                entry.write_u16::<BigEndian>(comp.len() as u16)?;
                entry.extend_from_slice(comp.as_bytes());
            }

            entry.write_u32::<BigEndian>(extra_u32(r, "name_type"))?;
            entry.write_u32::<BigEndian>(extra_u32(r, "timestamp"))?;
            entry.write_u8(extra_u32(r, "kvno") as u8)?;
            entry.write_u16::<BigEndian>(extra_u32(r, "key_type") as u16)?;

            let key_data = hex::decode(r.extra_get("key_data")).unwrap_or_default();
            entry.write_u16::<BigEndian>(key_data.len() as u16)?;
            entry.extend_from_slice(&key_data);

            out.write_i32::<BigEndian>(entry.len() as i32)?;
            out.extend_from_slice(&entry);
        }

        Ok(out)
    }
}

fn extra_u32(r: &Record, key: &str) -> u32 {
    r.extra_get(key).parse().unwrap_or(0)
}

/// Decode one positive-length entry. `None` means the entry was malformed;
/// the caller resumes at the entry's declared end.
fn parse_entry(buf: &[u8], version: u16) -> Option<Record> {
    let mut scan = ByteScan::new(buf);

    let mut num_components = scan.u16_be()? as usize;
    if version == VERSION_V1 {
        // historical off-by-one in the v1 encoding
        num_components += 1;
    }

    let realm_len = scan.u16_be()? as usize;
    let realm = String::from_utf8_lossy(scan.take(realm_len)?).into_owned();

    let mut components = Vec::with_capacity(num_components.min(64));
    for _ in 0..num_components {
        let Some(comp_len) = scan.u16_be() else { break };
        let Some(comp) = scan.take(comp_len as usize) else {
            break;
        };
        components.push(String::from_utf8_lossy(comp).into_owned());
    }

    // name type only exists in v2
    let name_type = if version == VERSION_V2 {
        scan.u32_be()?
    } else {
        0
    };

    let timestamp = scan.u32_be()?;
    let mut kvno = u32::from(scan.u8()?);
    let key_type = scan.u16_be()?;

    let key_len = scan.u16_be()? as usize;
    let key_data = scan.take(key_len).unwrap_or(&[]);

    // trailing 32-bit kvno override, only when bytes remain and it is nonzero
    if scan.remaining() >= 4
        && let Some(kvno32) = scan.u32_be()
        && kvno32 != 0
    {
        kvno = kvno32;
    }

    let mut r = Record::new();
    r.username = components.join("/");
    r.domain = realm;
    r.extra_str("key_type", key_type.to_string());
    r.extra_str("kvno", kvno.to_string());
    r.extra_str("timestamp", timestamp.to_string());
    r.extra_str("name_type", name_type.to_string());
    if !key_data.is_empty() {
        r.extra_str("key_data", hex::encode(key_data));
    }
    Some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_bytes(realm: &str, components: &[&str], kvno: u8, key: &[u8]) -> Vec<u8> {
        let mut e = Vec::new();
        e.write_u16::<BigEndian>(components.len() as u16).unwrap();
        e.write_u16::<BigEndian>(realm.len() as u16).unwrap();
        e.extend_from_slice(realm.as_bytes());
        for c in components {
            e.write_u16::<BigEndian>(c.len() as u16).unwrap();
            e.extend_from_slice(c.as_bytes());
        }
        e.write_u32::<BigEndian>(1).unwrap(); // name type
        e.write_u32::<BigEndian>(1700000000).unwrap(); // timestamp
        e.write_u8(kvno).unwrap();
        e.write_u16::<BigEndian>(18).unwrap(); // aes256 key type
        e.write_u16::<BigEndian>(key.len() as u16).unwrap();
        e.extend_from_slice(key);
        e
    }

    fn keytab_with(entries: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u16::<BigEndian>(VERSION_V2).unwrap();
        for e in entries {
            out.write_i32::<BigEndian>(e.len() as i32).unwrap();
            out.extend_from_slice(e);
        }
        out
    }

    #[test]
    fn parses_a_single_entry() {
        let e = entry_bytes("EXAMPLE.COM", &["host", "web01"], 3, &[0xAA; 8]);
        let ds = KerberosKeytab.parse(&keytab_with(&[e])).unwrap();
        let r = &ds.records[0];
        assert_eq!(r.username, "host/web01");
        assert_eq!(r.domain, "EXAMPLE.COM");
        assert_eq!(r.extra_get("kvno"), "3");
        assert_eq!(r.extra_get("key_type"), "18");
        assert_eq!(r.extra_get("key_data"), "aa".repeat(8));
    }

    #[test]
    fn tombstone_skips_exactly_the_declared_hole() {
        let live = entry_bytes("REALM", &["svc"], 1, &[0x01, 0x02]);
        let hole = 7usize;
        let mut raw = Vec::new();
        raw.write_u16::<BigEndian>(VERSION_V2).unwrap();
        raw.write_i32::<BigEndian>(-(hole as i32)).unwrap();
        raw.extend_from_slice(&vec![0xFF; hole]);
        raw.write_i32::<BigEndian>(live.len() as i32).unwrap();
        raw.extend_from_slice(&live);

        let ds = KerberosKeytab.parse(&raw).unwrap();
        assert_eq!(ds.meta.record_count, 1);
        assert_eq!(ds.records[0].username, "svc");
    }

    #[test]
    fn truncated_entry_is_dropped_without_failing_the_scan() {
        let good = entry_bytes("REALM", &["svc"], 1, &[0x01]);
        let mut raw = keytab_with(&[good]);
        // declare a second entry longer than the remaining bytes
        raw.write_i32::<BigEndian>(100).unwrap();
        raw.extend_from_slice(&[0x00; 4]);

        let ds = KerberosKeytab.parse(&raw).unwrap();
        assert_eq!(ds.meta.record_count, 1);
    }

    #[test]
    fn trailing_nonzero_kvno32_overrides_the_byte_kvno() {
        let mut e = entry_bytes("REALM", &["svc"], 3, &[0x01]);
        e.write_u32::<BigEndian>(260).unwrap();
        let ds = KerberosKeytab.parse(&keytab_with(&[e])).unwrap();
        assert_eq!(ds.records[0].extra_get("kvno"), "260");

        // zero override is ignored
        let mut e = entry_bytes("REALM", &["svc"], 3, &[0x01]);
        e.write_u32::<BigEndian>(0).unwrap();
        let ds = KerberosKeytab.parse(&keytab_with(&[e])).unwrap();
        assert_eq!(ds.records[0].extra_get("kvno"), "3");
    }

    #[test]
    fn legacy_version_adds_one_component() {
        // v1 entry declaring 0 components actually carries 1
        let mut e = Vec::new();
        e.write_u16::<BigEndian>(0).unwrap();
        e.write_u16::<BigEndian>(5).unwrap();
        e.extend_from_slice(b"REALM");
        e.write_u16::<BigEndian>(3).unwrap();
        e.extend_from_slice(b"svc");
        // no name type in v1
        e.write_u32::<BigEndian>(1700000000).unwrap();
        e.write_u8(2).unwrap();
        e.write_u16::<BigEndian>(17).unwrap();
        e.write_u16::<BigEndian>(0).unwrap();

        let mut raw = Vec::new();
        raw.write_u16::<BigEndian>(VERSION_V1).unwrap();
        raw.write_i32::<BigEndian>(e.len() as i32).unwrap();
        raw.extend_from_slice(&e);

        let ds = KerberosKeytab.parse(&raw).unwrap();
        assert_eq!(ds.records[0].username, "svc");
    }

    #[test]
    fn bad_magic_is_container_invalid() {
        assert!(KerberosKeytab.parse(&[0x05, 0x03, 0x00]).is_err());
        assert!(KerberosKeytab.parse(&[0x05]).is_err());
    }

    #[test]
    fn render_then_parse_preserves_principal_and_key() {
        let e = entry_bytes("EXAMPLE.COM", &["host", "web01"], 3, &[0xAB; 4]);
        let ds = KerberosKeytab.parse(&keytab_with(&[e])).unwrap();
        let rendered = KerberosKeytab.render(&ds).unwrap();
        let back = KerberosKeytab.parse(&rendered).unwrap();
        assert_eq!(back.records[0].username, "host/web01");
        assert_eq!(back.records[0].domain, "EXAMPLE.COM");
        assert_eq!(back.records[0].extra_get("key_data"), "ab".repeat(4));
    }
}
