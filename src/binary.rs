//! Shared machinery for schema-less binary decoding: a bounds-checked byte
//! scanner, text-payload absorption into records, and first-write-wins
//! merging of nested discoveries.
//!
//! Every multi-byte read checks the remaining buffer before slicing, so a
//! truncated or hostile input can stop a scan early but can never panic or
//! read out of bounds.
use crate::classify::classify_field;
use crate::record::Record;

/// Recursion cap for nested-structure recovery. Each level consumes at least
/// one byte, but deeply nested garbage must not exhaust the stack.
pub const MAX_NEST_DEPTH: usize = 32;

/// Cursor over an immutable byte buffer. All reads return `None` past the
/// end instead of failing.
pub struct ByteScan<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteScan<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Take `n` bytes, or `None` if fewer remain.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }

    /// Advance `n` bytes without reading. False (position unchanged) if
    /// fewer remain.
    pub fn skip(&mut self, n: usize) -> bool {
        if self.remaining() < n {
            return false;
        }
        self.pos += n;
        true
    }

    /// Jump to an absolute offset at or before the end of the buffer.
    pub fn seek(&mut self, pos: usize) -> bool {
        if pos > self.buf.len() {
            return false;
        }
        self.pos = pos;
        true
    }

    pub fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn u16_be(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32_be(&mut self) -> Option<u32> {
        self.take(4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32_be(&mut self) -> Option<i32> {
        self.u32_be().map(|v| v as i32)
    }

    pub fn i16_be(&mut self) -> Option<i16> {
        self.u16_be().map(|v| v as i16)
    }

    pub fn i64_be(&mut self) -> Option<i64> {
        self.take(8).map(|b| {
            i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })
    }

    pub fn u32_le(&mut self) -> Option<u32> {
        self.take(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64_le(&mut self) -> Option<u64> {
        self.take(8).map(|b| {
            u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })
    }

    /// LEB128 unsigned varint, at most 10 bytes. `None` on truncation or
    /// an unterminated encoding.
    pub fn varint(&mut self) -> Option<u64> {
        let mut value: u64 = 0;
        for i in 0..10 {
            let byte = self.u8()?;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Some(value);
            }
        }
        None
    }
}

/// Absorb a text payload recovered from a schema-less stream into a record
/// under a synthesized field name (`field_<n>` or similar):
/// classification first, then content sniffing, then `extra` — the value is
/// stored somewhere in every case.
pub fn absorb_text(r: &mut Record, field_name: &str, value: &str) {
    if classify_field(r, field_name, value) {
        return;
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        if r.url.is_empty() {
            r.url = value.to_string();
        } else {
            r.extra_str(field_name, value);
        }
    } else if value.contains('@') && value.contains('.') {
        if r.email.is_empty() {
            r.email = value.to_string();
        } else {
            r.extra_str(field_name, value);
        }
    } else {
        r.extra_str(field_name, value);
    }
}

/// Merge canonical fields discovered in a nested structure upward,
/// first-write-wins: a field already set on `dst` is never overwritten.
pub fn merge_missing(dst: &mut Record, src: &Record) {
    if dst.email.is_empty() && !src.email.is_empty() {
        dst.email = src.email.clone();
    }
    if dst.username.is_empty() && !src.username.is_empty() {
        dst.username = src.username.clone();
    }
    if dst.phone.is_empty() && !src.phone.is_empty() {
        dst.phone = src.phone.clone();
    }
    if dst.name.is_empty() && !src.name.is_empty() {
        dst.name = src.name.clone();
    }
    if dst.password.is_empty() && !src.password.is_empty() {
        dst.password = src.password.clone();
    }
    if dst.hash.is_none() && src.hash.is_some() {
        dst.hash = src.hash.clone();
    }
    if dst.salt.is_none() && src.salt.is_some() {
        dst.salt = src.salt.clone();
    }
    if dst.url.is_empty() && !src.url.is_empty() {
        dst.url = src.url.clone();
    }
    if dst.domain.is_empty() && !src.domain.is_empty() {
        dst.domain = src.domain.clone();
    }
    if dst.ip.is_empty() && !src.ip.is_empty() {
        dst.ip = src.ip.clone();
    }
    if dst.port == 0 && src.port != 0 {
        dst.port = src.port;
    }
}

/// Whether a record recovered any canonical field worth keeping.
pub fn has_canonical(r: &Record) -> bool {
    !r.email.is_empty()
        || !r.username.is_empty()
        || !r.password.is_empty()
        || !r.url.is_empty()
        || !r.domain.is_empty()
        || !r.ip.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_bounds_checked() {
        let mut s = ByteScan::new(&[0x01, 0x02, 0x03]);
        assert_eq!(s.u16_be(), Some(0x0102));
        assert_eq!(s.u32_be(), None);
        assert_eq!(s.pos(), 2);
        assert_eq!(s.u8(), Some(0x03));
        assert!(s.is_empty());
        assert_eq!(s.u8(), None);
    }

    #[test]
    fn skip_and_seek_refuse_overruns() {
        let mut s = ByteScan::new(&[0u8; 4]);
        assert!(s.skip(4));
        assert!(!s.skip(1));
        assert!(s.seek(0));
        assert!(!s.seek(5));
    }

    #[test]
    fn varint_decoding() {
        let mut s = ByteScan::new(&[0x96, 0x01]);
        assert_eq!(s.varint(), Some(150));
        // truncated continuation
        let mut s = ByteScan::new(&[0x80]);
        assert_eq!(s.varint(), None);
        // unterminated 10-byte run
        let mut s = ByteScan::new(&[0x80; 11]);
        assert_eq!(s.varint(), None);
    }

    #[test]
    fn absorb_sniffs_urls_and_emails() {
        let mut r = Record::new();
        absorb_text(&mut r, "field_1", "https://example.com");
        assert_eq!(r.url, "https://example.com");
        absorb_text(&mut r, "field_2", "a@b.com");
        assert_eq!(r.email, "a@b.com");
        // second url falls to extra, url untouched
        absorb_text(&mut r, "field_3", "http://other.example");
        assert_eq!(r.url, "https://example.com");
        assert_eq!(r.extra_get("field_3"), "http://other.example");
        // plain text falls to extra
        absorb_text(&mut r, "field_4", "hello");
        assert_eq!(r.extra_get("field_4"), "hello");
    }

    #[test]
    fn merge_is_first_write_wins() {
        let mut outer = Record::new();
        outer.email = "outer@x.com".into();
        let mut inner = Record::new();
        inner.email = "inner@x.com".into();
        inner.username = "inner".into();
        merge_missing(&mut outer, &inner);
        assert_eq!(outer.email, "outer@x.com");
        assert_eq!(outer.username, "inner");
    }
}
