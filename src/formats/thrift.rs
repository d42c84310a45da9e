//! Thrift binary-protocol codec. No schema is available, so field names are
//! synthesized from field ids (`field_<n>`) and payloads are recovered
//! best-effort: classification, then content sniffing, then `extra`.
use byteorder::{BigEndian, WriteBytesExt};

use crate::binary::{ByteScan, MAX_NEST_DEPTH, absorb_text, has_canonical, merge_missing};
use crate::classify::record_to_map;
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record};

const T_STOP: u8 = 0;
const T_BOOL: u8 = 2;
const T_BYTE: u8 = 3;
const T_I16: u8 = 6;
const T_I32: u8 = 8;
const T_I64: u8 = 10;
const T_STRING: u8 = 11;
const T_STRUCT: u8 = 12;

const MAX_STRING_LEN: i32 = 10 * 1024 * 1024;

pub struct Thrift;

impl Codec for Thrift {
    fn name(&self) -> &'static str {
        "thrift"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let mut scan = ByteScan::new(raw);
        let mut records = Vec::new();

        while !scan.is_empty() {
            let Some(r) = parse_struct(&mut scan, 0) else {
                break;
            };
            if has_canonical(&r) {
                records.push(r);
            }
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
            let mut field_id: u16 = 1;
            for key in [
                "email", "username", "password", "url", "domain", "ip", "phone", "name", "hash",
            ] {
                if let Some(val) = m.get(key) {
                    out.write_u8(T_STRING)?;
                    out.write_u16::<BigEndian>(field_id)?;
                    out.write_i32::<BigEndian>(val.len() as i32)?;
                    out.extend_from_slice(val.as_bytes());
                }
                field_id += 1;
            }
            out.write_u8(T_STOP)?;
        }
        Ok(out)
    }
}

/// Walk one struct's fields until a stop byte. `None` means framing broke
/// before the stop byte; everything consumed so far is discarded with it.
fn parse_struct(scan: &mut ByteScan<'_>, depth: usize) -> Option<Record> {
    if depth > MAX_NEST_DEPTH {
        return None;
    }
    let mut r = Record::new();

    loop {
        let type_byte = scan.u8()?;
        if type_byte == T_STOP {
            break;
        }
        let field_id = scan.u16_be()?;
        let field_name = format!("field_{field_id}");

        match type_byte {
            T_STRING => {
                let len = scan.i32_be()?;
                if !(0..=MAX_STRING_LEN).contains(&len) {
                    return None;
                }
                let data = scan.take(len as usize)?;
                match std::str::from_utf8(data) {
                    Ok(s) => absorb_text(&mut r, &field_name, s),
                    Err(_) => r.extra_str(&field_name, hex::encode(data)),
                }
            }
            T_BOOL => {
                let v = scan.u8()?;
                r.extra
                    .insert(field_name, serde_json::Value::Bool(v != 0));
            }
            T_BYTE => {
                let v = scan.u8()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            T_I16 => {
                let v = scan.i16_be()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            T_I32 => {
                let v = scan.i32_be()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            T_I64 => {
                let v = scan.i64_be()?;
                r.extra.insert(field_name, serde_json::Value::from(v));
            }
            T_STRUCT => {
                let sub = parse_struct(scan, depth + 1)?;
                merge_missing(&mut r, &sub);
            }
            _ => {
                // unknown field type: framing is unrecoverable from here
                return None;
            }
        }
    }

    Some(r)
}
