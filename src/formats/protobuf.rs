//! Protobuf wire-format codec. Without a descriptor the decoder walks the
//! tag/wire-type stream directly: length-delimited payloads that hold valid
//! text are absorbed under synthesized `field_<n>` names, binary payloads are
//! retried as nested messages, and whatever remains is kept hex-encoded.
use crate::binary::{ByteScan, MAX_NEST_DEPTH, absorb_text, merge_missing};
use crate::classify::record_to_map;
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record};

const WIRE_VARINT: u64 = 0;
const WIRE_FIXED64: u64 = 1;
const WIRE_BYTES: u64 = 2;
const WIRE_FIXED32: u64 = 5;

pub struct Protobuf;

impl Codec for Protobuf {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        // first as a wrapper message of repeated field-1 sub-messages,
        // then as a single bare message
        let mut records = parse_wrapper(raw);
        if records.is_empty()
            && let Some(r) = parse_message(raw, 0)
        {
            records.push(r);
        }

        if records.is_empty() {
            return Err(ParseError::ZeroRecoverable {
                format: self.name(),
            });
        }

        let cols = crate::classify::detect_columns(&records);
        Ok(Dataset::assemble_uniform(self.name(), cols, 0.3, records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        for r in &ds.records {
            let m = record_to_map(r);
            let mut msg = Vec::new();
            let mut field_num: u64 = 1;
            for key in [
                "email", "username", "password", "url", "domain", "ip", "phone", "name", "hash",
            ] {
                if let Some(val) = m.get(key) {
                    append_tag(&mut msg, field_num, WIRE_BYTES);
                    append_varint(&mut msg, val.len() as u64);
                    msg.extend_from_slice(val.as_bytes());
                }
                field_num += 1;
            }
            append_tag(&mut out, 1, WIRE_BYTES);
            append_varint(&mut out, msg.len() as u64);
            out.extend_from_slice(&msg);
        }
        Ok(out)
    }
}

fn append_varint(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn append_tag(out: &mut Vec<u8>, field_num: u64, wire_type: u64) {
    append_varint(out, (field_num << 3) | wire_type);
}

/// Try `raw` as repeated `field 1: bytes` wrapper entries.
fn parse_wrapper(raw: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut scan = ByteScan::new(raw);

    while !scan.is_empty() {
        let Some(tag) = scan.varint() else { break };
        if tag & 0x7 != WIRE_BYTES {
            break;
        }
        let Some(len) = scan.varint() else { break };
        let Some(data) = scan.take(len as usize) else {
            break;
        };
        if tag >> 3 == 1
            && let Some(r) = parse_message(data, 0)
        {
            records.push(r);
        }
    }
    records
}

/// Decode a single message. `None` when no field classified or sniffed into
/// a canonical slot — a message that is all noise is not a record.
fn parse_message(data: &[u8], depth: usize) -> Option<Record> {
    if depth > MAX_NEST_DEPTH {
        return None;
    }
    let mut r = Record::new();
    let mut matched = 0usize;
    let mut scan = ByteScan::new(data);

    while !scan.is_empty() {
        let Some(tag) = scan.varint() else { break };
        let field_num = tag >> 3;
        if field_num == 0 {
            break;
        }
        let field_name = format!("field_{field_num}");

        match tag & 0x7 {
            WIRE_BYTES => {
                let len = scan.varint()?;
                let val = scan.take(len as usize)?;
                match std::str::from_utf8(val) {
                    Ok(s) => {
                        let before = matched_fingerprint(&r);
                        absorb_text(&mut r, &field_name, s);
                        if matched_fingerprint(&r) != before {
                            matched += 1;
                        }
                    }
                    Err(_) => {
                        // retry as a nested message of the same shape
                        if let Some(sub) = parse_message(val, depth + 1) {
                            let before = matched_fingerprint(&r);
                            merge_missing(&mut r, &sub);
                            if matched_fingerprint(&r) != before {
                                matched += 1;
                            }
                        } else {
                            r.extra_str(&field_name, hex::encode(val));
                        }
                    }
                }
            }
            WIRE_VARINT => {
                let v = scan.varint()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            WIRE_FIXED32 => {
                let v = scan.u32_le()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            WIRE_FIXED64 => {
                let v = scan.u64_le()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            _ => {
                // unknown wire type: stop here, keep what was recovered
                break;
            }
        }
    }

    if matched > 0 { Some(r) } else { None }
}

/// Cheap change detector over the canonical fields `absorb_text` and
/// `merge_missing` can touch.
fn matched_fingerprint(r: &Record) -> usize {
    [
        !r.email.is_empty(),
        !r.username.is_empty(),
        !r.phone.is_empty(),
        !r.name.is_empty(),
        !r.password.is_empty(),
        !r.url.is_empty(),
        !r.domain.is_empty(),
        !r.ip.is_empty(),
    ]
    .iter()
    .filter(|b| **b)
    .count()
}
