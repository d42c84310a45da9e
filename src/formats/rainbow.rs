//! Rainbow-table chain files: headerless fixed-width records of
//! little-endian chain start/end indices.
//!
//! The record width is auto-detected by testing candidate widths in a fixed
//! order against even divisibility of the total length; the first candidate
//! that divides evenly wins, even when several do. The width maps to an
//! assumed algorithm label purely for annotation.
use byteorder::{LittleEndian, WriteBytesExt};

use crate::binary::ByteScan;
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record};

const CHAIN_WIDTHS: [usize; 4] = [16, 24, 28, 32];

fn width_algo(width: usize) -> &'static str {
    match width {
        16 => "md5/ntlm",
        24 => "sha1",
        28 => "sha256",
        32 => "sha512",
        _ => "unknown",
    }
}

pub struct RainbowTable;

impl Codec for RainbowTable {
    fn name(&self) -> &'static str {
        "rainbow_table"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let width = CHAIN_WIDTHS
            .iter()
            .copied()
            .find(|w| raw.len() >= *w && raw.len() % w == 0)
            .ok_or_else(|| {
                ParseError::container(
                    self.name(),
                    format!("cannot determine chain size from {} bytes", raw.len()),
                )
            })?;

        let algo = width_algo(width);
        let num_chains = raw.len() / width;
        let mut records = Vec::with_capacity(num_chains);
        let mut scan = ByteScan::new(raw);

        for i in 0..num_chains {
            // width >= 16, so both indices are always present
            let Some(chain_start) = scan.u64_le() else {
                break;
            };
            let Some(chain_end) = scan.u64_le() else {
                break;
            };
            let mut r = Record::new();
            r.extra_str("chain_start", chain_start.to_string());
            r.extra_str("chain_end", chain_end.to_string());
            r.extra_str("chain_index", i.to_string());
            r.extra_str("algorithm", algo);
            if width > 16
                && let Some(rest) = scan.take(width - 16)
            {
                r.extra_str("chain_extra", hex::encode(rest));
            }
            records.push(r);
        }

        Ok(Dataset::assemble(
            self.name(),
            Vec::new(),
            Default::default(),
            records,
        ))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        for r in &ds.records {
            let start: u64 = r.extra_get("chain_start").parse().unwrap_or(0);
            let end: u64 = r.extra_get("chain_end").parse().unwrap_or(0);
            out.write_u64::<LittleEndian>(start)?;
            out.write_u64::<LittleEndian>(end)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_32_byte_buffer_resolves_to_two_width_16_chains() {
        // 32 divides by 16 first, so it is never seen as one 32-byte chain
        let mut raw = Vec::new();
        raw.write_u64::<LittleEndian>(42).unwrap();
        raw.write_u64::<LittleEndian>(99).unwrap();
        raw.extend_from_slice(&[0xCD; 16]);
        let ds = RainbowTable.parse(&raw).unwrap();
        assert_eq!(ds.meta.record_count, 2);
        let r = &ds.records[0];
        assert_eq!(r.extra_get("algorithm"), "md5/ntlm");
        assert_eq!(r.extra_get("chain_start"), "42");
        assert_eq!(r.extra_get("chain_end"), "99");
        assert_eq!(r.extra_get("chain_extra"), "");
        assert_eq!(ds.records[1].extra_get("chain_index"), "1");
    }

    #[test]
    fn width_28_carries_trailing_bytes_as_chain_extra() {
        let mut raw = Vec::new();
        raw.write_u64::<LittleEndian>(7).unwrap();
        raw.write_u64::<LittleEndian>(8).unwrap();
        raw.extend_from_slice(&[0xAB; 12]);
        let ds = RainbowTable.parse(&raw).unwrap();
        assert_eq!(ds.meta.record_count, 1);
        let r = &ds.records[0];
        assert_eq!(r.extra_get("algorithm"), "sha256");
        assert_eq!(r.extra_get("chain_extra"), "ab".repeat(12));
    }

    #[test]
    fn ambiguous_48_bytes_resolve_to_the_first_candidate() {
        // 48 divides by both 16 and 24; 16 is listed first
        let ds = RainbowTable.parse(&[0u8; 48]).unwrap();
        assert_eq!(ds.meta.record_count, 3);
        assert_eq!(ds.records[0].extra_get("algorithm"), "md5/ntlm");
    }

    #[test]
    fn indivisible_lengths_are_container_invalid() {
        assert!(RainbowTable.parse(&[0u8; 17]).is_err());
        assert!(RainbowTable.parse(&[]).is_err());
        assert!(RainbowTable.parse(&[0u8; 8]).is_err());
    }

    #[test]
    fn render_emits_start_end_pairs() {
        let mut raw = Vec::new();
        raw.write_u64::<LittleEndian>(7).unwrap();
        raw.write_u64::<LittleEndian>(8).unwrap();
        let ds = RainbowTable.parse(&raw).unwrap();
        let out = RainbowTable.render(&ds).unwrap();
        assert_eq!(out, raw);
    }
}
